//! Descriptive statistics and sales aggregates.
//!
//! Everything here reads the cleaned table and never modifies it.

pub mod aggregations;

pub use aggregations::{group_sum, monthly_totals, top_n, weekday_totals};

use crate::columns;
use crate::types::{ColumnDescription, SalesSummary};
use crate::utils::{column_values, mean, quantile_sorted, sample_std, sorted};
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, info};

/// Columns described by [`Summarizer::summarize`].
pub const DESCRIBED_COLUMNS: [&str; 3] =
    [columns::QUANTITY, columns::UNIT_PRICE, columns::TOTAL_SALES];

/// Computes the sales summary of a cleaned table.
#[derive(Debug, Clone, Copy)]
pub struct Summarizer {
    top_n: usize,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self { top_n: 10 }
    }
}

impl Summarizer {
    /// Summarizer whose rankings hold `top_n` entries.
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    /// Compute all statistics and aggregates.
    pub fn summarize(&self, df: &DataFrame) -> Result<SalesSummary> {
        info!("Summarizing {} cleaned rows...", df.height());

        let descriptions = DESCRIBED_COLUMNS
            .iter()
            .filter(|name| df.column(name).is_ok())
            .map(|name| Self::describe(df, name))
            .collect::<Result<Vec<_>>>()?;

        let summary = SalesSummary {
            descriptions,
            sales_by_country: top_n(df, columns::COUNTRY, columns::TOTAL_SALES, self.top_n)?,
            monthly_sales: monthly_totals(df, columns::MONTH, columns::TOTAL_SALES)?,
            weekday_sales: weekday_totals(df, columns::DAY_OF_WEEK, columns::TOTAL_SALES)?,
            top_products_by_quantity: top_n(
                df,
                columns::DESCRIPTION,
                columns::QUANTITY,
                self.top_n,
            )?,
            top_countries_by_quantity: top_n(
                df,
                columns::COUNTRY,
                columns::QUANTITY,
                self.top_n,
            )?,
        };

        debug!(
            "Summary: {} countries ranked, {} months with sales",
            summary.sales_by_country.len(),
            summary.monthly_sales.len()
        );
        Ok(summary)
    }

    /// count/mean/std/min/quartiles/max of a numeric column.
    pub fn describe(df: &DataFrame, column: &str) -> Result<ColumnDescription> {
        let values = sorted(&column_values(df, column)?);
        Ok(ColumnDescription {
            column: column.to_string(),
            count: values.len(),
            mean: mean(&values),
            std: sample_std(&values),
            min: values.first().copied(),
            q25: quantile_sorted(&values, 0.25),
            median: quantile_sorted(&values, 0.5),
            q75: quantile_sorted(&values, 0.75),
            max: values.last().copied(),
        })
    }
}
