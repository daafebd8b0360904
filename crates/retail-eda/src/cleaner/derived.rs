//! Columns derived from a cleaned table: sales totals and calendar keys.

use super::dates::datetime_values;
use crate::columns;
use crate::utils::column_f64;
use anyhow::Result;
use chrono::{Datelike, Weekday};
use polars::prelude::*;

/// Weekday names, Monday first.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// English name of a weekday.
pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAYS[day.num_days_from_monday() as usize]
}

/// Append `TotalSales`, `Month` and `DayOfWeek`.
///
/// Expects `InvoiceDate` to already be a datetime column. Existing derived
/// columns are overwritten, so the operation can be repeated safely.
pub(crate) fn add_derived_columns(df: &DataFrame) -> Result<DataFrame> {
    let quantity = column_f64(df, columns::QUANTITY)?;
    let price = column_f64(df, columns::UNIT_PRICE)?;
    let total: Vec<Option<f64>> = quantity
        .iter()
        .zip(&price)
        .map(|(q, p)| Some((*q)? * (*p)?))
        .collect();

    let dates = datetime_values(df.column(columns::INVOICE_DATE)?.as_materialized_series())?;
    let months: Vec<Option<i32>> = dates.iter().map(|d| d.map(|d| d.month() as i32)).collect();
    let weekdays: Vec<Option<&str>> = dates
        .iter()
        .map(|d| d.map(|d| weekday_name(d.weekday())))
        .collect();

    let mut out = df.clone();
    out.with_column(Series::new(columns::TOTAL_SALES.into(), total))?;
    out.with_column(Series::new(columns::MONTH.into(), months))?;
    out.with_column(Series::new(columns::DAY_OF_WEEK.into(), weekdays))?;
    Ok(out)
}
