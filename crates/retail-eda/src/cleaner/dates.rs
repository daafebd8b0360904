//! Invoice timestamp parsing.

use crate::utils::is_datetime_dtype;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Date-time layouts tried in order after RFC 3339.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M",
];

/// Date-only layouts, read as midnight.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a single timestamp string. Returns `None` when no layout matches.
pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Convert a column to `Datetime(ms)`. Values that cannot be parsed become null.
pub(crate) fn to_datetime_series(series: &Series) -> Result<Series> {
    let target = DataType::Datetime(TimeUnit::Milliseconds, None);

    if is_datetime_dtype(series.dtype()) {
        return Ok(series.cast(&target)?);
    }

    let as_text = series.cast(&DataType::String)?;
    let millis: Vec<Option<i64>> = as_text
        .str()?
        .into_iter()
        .map(|v| v.and_then(parse_timestamp).map(|dt| dt.and_utc().timestamp_millis()))
        .collect();

    Ok(Series::new(series.name().clone(), millis).cast(&target)?)
}

/// Read a `Datetime` column back as naive timestamps.
pub(crate) fn datetime_values(series: &Series) -> Result<Vec<Option<NaiveDateTime>>> {
    let millis = series
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        .cast(&DataType::Int64)?;
    Ok(millis
        .i64()?
        .into_iter()
        .map(|v| v.and_then(DateTime::from_timestamp_millis).map(|dt| dt.naive_utc()))
        .collect())
}
