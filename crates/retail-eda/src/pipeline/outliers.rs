//! Outlier detection module.
//!
//! Flags rows whose quantity or unit price falls outside the Tukey fences
//! `Q1 - 1.5*IQR` and `Q3 + 1.5*IQR`, computed independently per column.
//! Detection only counts; the table is left untouched.

use crate::columns;
use crate::types::{IqrFence, OutlierReport};
use crate::utils::{column_f64, quantile_sorted, sorted};
use anyhow::Result;
use polars::prelude::*;
use tracing::debug;

/// Fence multiplier applied to the interquartile range.
pub const IQR_MULTIPLIER: f64 = 1.5;

/// Columns checked by [`OutlierDetector::default`].
pub const OUTLIER_COLUMNS: [&str; 2] = [columns::QUANTITY, columns::UNIT_PRICE];

/// Counts IQR outliers over a fixed set of numeric columns.
#[derive(Debug, Clone)]
pub struct OutlierDetector {
    columns: Vec<String>,
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self::new(OUTLIER_COLUMNS)
    }
}

impl OutlierDetector {
    /// Detector over the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Compute the fences of `values` (nulls already removed).
    ///
    /// Returns `None` for an empty column.
    pub fn fence(column: &str, values: &[f64]) -> Option<IqrFence> {
        let sorted = sorted(values);
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let lower = q1 - IQR_MULTIPLIER * iqr;
        let upper = q3 + IQR_MULTIPLIER * iqr;
        let outliers = values.iter().filter(|v| **v < lower || **v > upper).count();

        Some(IqrFence {
            column: column.to_string(),
            q1,
            q3,
            iqr,
            lower,
            upper,
            outliers,
        })
    }

    /// Count rows that are outliers in at least one column.
    pub fn detect(&self, df: &DataFrame) -> Result<OutlierReport> {
        let mut flagged = vec![false; df.height()];
        let mut fences = Vec::with_capacity(self.columns.len());

        for name in &self.columns {
            let values = column_f64(df, name)?;
            let present: Vec<f64> = values.iter().flatten().copied().collect();

            let Some(fence) = Self::fence(name, &present) else {
                debug!("Column {} has no values; skipping outlier check", name);
                continue;
            };

            for (row, value) in values.iter().enumerate() {
                if value.is_some_and(|v| fence.is_outlier(v)) {
                    flagged[row] = true;
                }
            }

            debug!(
                "{}: Q1={:.3}, Q3={:.3}, fences=[{:.3}, {:.3}], {} outliers",
                name, fence.q1, fence.q3, fence.lower, fence.upper, fence.outliers
            );
            fences.push(fence);
        }

        let rows_flagged = flagged.iter().filter(|f| **f).count();
        debug!("Flagged {} of {} rows as outliers", rows_flagged, df.height());

        Ok(OutlierReport {
            fences,
            rows_flagged,
            rows_checked: df.height(),
        })
    }
}
