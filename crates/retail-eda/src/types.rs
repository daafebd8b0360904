use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Cleaning
// ============================================================================

/// Missing values found in one column of the raw table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingValueCount {
    pub column: String,
    pub missing: usize,
}

/// Outcome of the cleaning stage.
///
/// The `*_removed` counters are taken sequentially: each one counts rows
/// dropped from what survived the previous step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    /// Missing values per column of the raw table, in column order.
    pub missing_values: Vec<MissingValueCount>,
    pub missing_customer_removed: usize,
    pub non_positive_quantity_removed: usize,
    pub non_positive_price_removed: usize,
    pub invalid_dates_removed: usize,
    pub duplicates_removed: usize,
    /// Human-readable log of the actions taken.
    pub actions: Vec<String>,
}

impl CleaningReport {
    /// Total rows removed by all steps.
    pub fn rows_removed(&self) -> usize {
        self.rows_before - self.rows_after
    }

    /// Missing count for `column` in the raw table (0 if unknown).
    pub fn missing_in(&self, column: &str) -> usize {
        self.missing_values
            .iter()
            .find(|m| m.column == column)
            .map(|m| m.missing)
            .unwrap_or(0)
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// One entry of a grouped total (country, product, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTotal {
    pub label: String,
    pub total: f64,
}

/// Sales total for a calendar month (1-12).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: u32,
    pub total: f64,
}

/// Sales total for a weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayTotal {
    pub day: String,
    pub total: f64,
}

/// Everything the summarizer computes from the cleaned table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub descriptions: Vec<ColumnDescription>,
    pub sales_by_country: Vec<RankedTotal>,
    pub monthly_sales: Vec<MonthlyTotal>,
    pub weekday_sales: Vec<WeekdayTotal>,
    pub top_products_by_quantity: Vec<RankedTotal>,
    pub top_countries_by_quantity: Vec<RankedTotal>,
}

impl SalesSummary {
    /// Description for `column`, if it was described.
    pub fn description(&self, column: &str) -> Option<&ColumnDescription> {
        self.descriptions.iter().find(|d| d.column == column)
    }

    /// Month with the highest sales.
    pub fn peak_month(&self) -> Option<&MonthlyTotal> {
        self.monthly_sales
            .iter()
            .fold(None, |best: Option<&MonthlyTotal>, m| match best {
                Some(b) if b.total >= m.total => Some(b),
                _ => Some(m),
            })
    }

    /// Weekday with the highest sales.
    pub fn peak_weekday(&self) -> Option<&WeekdayTotal> {
        self.weekday_sales
            .iter()
            .fold(None, |best: Option<&WeekdayTotal>, d| match best {
                Some(b) if b.total >= d.total => Some(b),
                _ => Some(d),
            })
    }
}

// ============================================================================
// Outliers
// ============================================================================

/// IQR fences of one column and how many values fall outside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IqrFence {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
    pub outliers: usize,
}

impl IqrFence {
    /// Whether `value` lies strictly outside the fences.
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Result of outlier detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub fences: Vec<IqrFence>,
    /// Rows flagged in at least one column.
    pub rows_flagged: usize,
    pub rows_checked: usize,
}

impl OutlierReport {
    /// Share of checked rows that were flagged, in percent.
    pub fn flagged_percentage(&self) -> f64 {
        if self.rows_checked == 0 {
            0.0
        } else {
            self.rows_flagged as f64 / self.rows_checked as f64 * 100.0
        }
    }
}

// ============================================================================
// Pipeline result
// ============================================================================

/// Everything produced by one run of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Textual preview of the first raw rows.
    pub preview: String,
    pub cleaning: CleaningReport,
    pub summary: SalesSummary,
    pub outliers: OutlierReport,
    /// Files written by the chart renderer.
    pub charts: Vec<PathBuf>,
    pub duration_ms: u64,
}
