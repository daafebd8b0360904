//! Data cleaning for the transaction log.
//!
//! The cleaner applies, in this order:
//! 1. Drop rows without a customer identifier
//! 2. Drop rows with quantity <= 0
//! 3. Drop rows with unit price <= 0
//! 4. Parse invoice dates, dropping rows that fail to parse
//! 5. Drop exact-duplicate rows (first occurrence kept)
//!
//! and then appends the derived `TotalSales`, `Month` and `DayOfWeek`
//! columns. Every step takes a table and returns a new one; per-row problems
//! are counted in the [`CleaningReport`], never raised as errors.

mod dates;
mod derived;

pub use derived::{WEEKDAYS, weekday_name};

use crate::columns;
use crate::types::{CleaningReport, MissingValueCount};
use crate::utils::column_f64;
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Data cleaner for the retail transaction log.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataCleaner;

impl DataCleaner {
    /// Clean the raw table and report what was removed.
    pub fn clean(&self, df: &DataFrame) -> Result<(DataFrame, CleaningReport)> {
        info!("Performing data cleaning...");

        let mut report = CleaningReport {
            rows_before: df.height(),
            missing_values: Self::count_missing(df),
            ..Default::default()
        };

        let base = Self::strip_derived(df);

        let step = Self::drop_missing_customers(&base)?;
        report.missing_customer_removed = base.height() - step.height();
        report.actions.push(format!(
            "Removed {} rows without {}",
            report.missing_customer_removed,
            columns::CUSTOMER_ID
        ));
        debug!("Removed {} rows without customer id", report.missing_customer_removed);

        let before = step.height();
        let step = Self::drop_non_positive(&step, columns::QUANTITY)?;
        report.non_positive_quantity_removed = before - step.height();
        report.actions.push(format!(
            "Removed {} rows with non-positive {}",
            report.non_positive_quantity_removed,
            columns::QUANTITY
        ));
        debug!(
            "Removed {} rows with non-positive quantity",
            report.non_positive_quantity_removed
        );

        let before = step.height();
        let step = Self::drop_non_positive(&step, columns::UNIT_PRICE)?;
        report.non_positive_price_removed = before - step.height();
        report.actions.push(format!(
            "Removed {} rows with non-positive {}",
            report.non_positive_price_removed,
            columns::UNIT_PRICE
        ));
        debug!(
            "Removed {} rows with non-positive unit price",
            report.non_positive_price_removed
        );

        let before = step.height();
        let step = Self::parse_invoice_dates(&step)?;
        report.invalid_dates_removed = before - step.height();
        report.actions.push(format!(
            "Removed {} rows with unparseable {}",
            report.invalid_dates_removed,
            columns::INVOICE_DATE
        ));
        debug!("Removed {} rows with invalid dates", report.invalid_dates_removed);

        let before = step.height();
        let step = Self::drop_duplicates(&step)?;
        report.duplicates_removed = before - step.height();
        if report.duplicates_removed > 0 {
            let pct = (report.duplicates_removed as f64 / before as f64) * 100.0;
            report.actions.push(format!(
                "Removed {} duplicate rows ({:.1}%)",
                report.duplicates_removed, pct
            ));
        } else {
            report.actions.push("No duplicate rows found".to_string());
        }
        debug!("Removed {} duplicate rows", report.duplicates_removed);

        let cleaned = derived::add_derived_columns(&step)?;
        report.rows_after = cleaned.height();

        if cleaned.height() == 0 {
            warn!("No rows survived cleaning");
        }
        info!(
            "Cleaning complete: {} -> {} rows",
            report.rows_before, report.rows_after
        );

        Ok((cleaned, report))
    }

    /// Null counts per column, in column order.
    pub fn count_missing(df: &DataFrame) -> Vec<MissingValueCount> {
        df.get_columns()
            .iter()
            .map(|col| MissingValueCount {
                column: col.name().to_string(),
                missing: col.null_count(),
            })
            .collect()
    }

    /// Drop rows whose customer identifier is null or blank.
    pub fn drop_missing_customers(df: &DataFrame) -> Result<DataFrame> {
        let series = df.column(columns::CUSTOMER_ID)?.as_materialized_series();
        let mask: Vec<bool> = if series.dtype() == &DataType::String {
            series
                .str()?
                .into_iter()
                .map(|v| v.is_some_and(|s| !s.trim().is_empty()))
                .collect()
        } else {
            series.is_not_null().into_iter().map(|v| v.unwrap_or(false)).collect()
        };
        Ok(df.filter(&BooleanChunked::from_slice("mask".into(), &mask))?)
    }

    /// Drop rows where `column` is null or not strictly positive.
    pub fn drop_non_positive(df: &DataFrame, column: &str) -> Result<DataFrame> {
        let mask: Vec<bool> = column_f64(df, column)?
            .into_iter()
            .map(|v| v.is_some_and(|x| x > 0.0))
            .collect();
        Ok(df.filter(&BooleanChunked::from_slice("mask".into(), &mask))?)
    }

    /// Replace `InvoiceDate` with a datetime column, dropping unparseable rows.
    pub fn parse_invoice_dates(df: &DataFrame) -> Result<DataFrame> {
        let series = df.column(columns::INVOICE_DATE)?.as_materialized_series();
        let parsed = dates::to_datetime_series(series)?;
        let mask = parsed.is_not_null();

        let mut out = df.clone();
        out.replace(columns::INVOICE_DATE, parsed)?;
        Ok(out.filter(&mask)?)
    }

    /// Drop exact-duplicate rows, keeping the first occurrence in order.
    pub fn drop_duplicates(df: &DataFrame) -> Result<DataFrame> {
        Ok(df.unique_stable(None, UniqueKeepStrategy::First, None)?)
    }

    fn strip_derived(df: &DataFrame) -> DataFrame {
        let present: Vec<PlSmallStr> = columns::DERIVED
            .iter()
            .filter(|name| df.column(name).is_ok())
            .map(|name| (*name).into())
            .collect();
        if present.is_empty() {
            df.clone()
        } else {
            df.drop_many(present)
        }
    }
}
