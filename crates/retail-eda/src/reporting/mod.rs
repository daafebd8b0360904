//! Report generation module.
//!
//! Two outputs are produced from an [`AnalysisResult`]:
//!
//! - a fixed, human-readable text report ([`TextReporter`]) written to any
//!   [`std::io::Write`] sink
//! - a serializable [`AnalysisReport`] for JSON output (`--json` prints it,
//!   `--emit-report` writes `<output_dir>/<stem>_report.json`)
//!
//! # Example
//!
//! ```rust,ignore
//! use retail_eda::reporting::{ReportGenerator, TextReporter};
//!
//! TextReporter::default().write_report(&mut std::io::stdout(), &result)?;
//!
//! let report = ReportGenerator::build_report("Online Retail.csv", &result);
//! ReportGenerator::new("outputs".into()).write_report_to_file(&report, "Online Retail")?;
//! ```

mod generator;
mod text;

pub use generator::{AnalysisReport, ReportGenerator};
pub use text::TextReporter;

use crate::types::AnalysisResult;
use crate::visualizer::month_name;

/// Narrative findings drawn from the analysis, one sentence each.
pub fn findings(result: &AnalysisResult) -> Vec<String> {
    let cleaning = &result.cleaning;
    let summary = &result.summary;
    let mut lines = vec![format!(
        "The dataset was cleaned from {} to {} rows by removing missing customer IDs, \
         non-positive quantities/prices, unparseable dates and {} duplicates.",
        cleaning.rows_before, cleaning.rows_after, cleaning.duplicates_removed
    )];

    if let Some(peak) = summary.peak_month() {
        lines.push(format!(
            "Sales are highest in {} ({:.2}), indicating seasonal trends.",
            month_name(peak.month),
            peak.total
        ));
    }

    if let Some(peak) = summary.peak_weekday().filter(|d| d.total > 0.0) {
        let quiet: Vec<&str> = summary
            .weekday_sales
            .iter()
            .filter(|d| d.total == 0.0)
            .map(|d| d.day.as_str())
            .collect();
        let mut line = format!(
            "{} has the highest sales ({:.2}), suggesting targeted promotions.",
            peak.day, peak.total
        );
        if !quiet.is_empty() {
            line.push_str(&format!(" No sales on {}.", quiet.join(", ")));
        }
        lines.push(line);
    }

    if let (Some(product), Some(country)) = (
        summary.top_products_by_quantity.first(),
        summary.sales_by_country.first(),
    ) {
        lines.push(format!(
            "Top product by quantity is {} ({} units); top country by sales is {} ({:.2}).",
            product.label, product.total, country.label, country.total
        ));
    }

    if result.outliers.rows_flagged > 0 {
        lines.push(format!(
            "{} rows ({:.1}%) are outliers in quantity or unit price; they may be bulk \
             orders or errors needing further investigation.",
            result.outliers.rows_flagged,
            result.outliers.flagged_percentage()
        ));
    } else {
        lines.push("No quantity or unit-price outliers were detected.".to_string());
    }

    lines
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::*;

    /// Small, fully populated result used by the reporting tests.
    pub fn sample_result() -> AnalysisResult {
        AnalysisResult {
            preview: "shape: (5, 8)".to_string(),
            cleaning: CleaningReport {
                rows_before: 5,
                rows_after: 1,
                missing_values: vec![MissingValueCount {
                    column: "CustomerID".to_string(),
                    missing: 1,
                }],
                missing_customer_removed: 1,
                non_positive_quantity_removed: 1,
                non_positive_price_removed: 1,
                invalid_dates_removed: 0,
                duplicates_removed: 1,
                actions: vec!["Removed 1 duplicate rows (50.0%)".to_string()],
            },
            summary: SalesSummary {
                descriptions: vec![ColumnDescription {
                    column: "Quantity".to_string(),
                    count: 1,
                    mean: Some(6.0),
                    std: None,
                    min: Some(6.0),
                    q25: Some(6.0),
                    median: Some(6.0),
                    q75: Some(6.0),
                    max: Some(6.0),
                }],
                sales_by_country: vec![RankedTotal {
                    label: "Germany".to_string(),
                    total: 18.0,
                }],
                monthly_sales: vec![MonthlyTotal {
                    month: 12,
                    total: 18.0,
                }],
                weekday_sales: crate::cleaner::WEEKDAYS
                    .iter()
                    .map(|d| WeekdayTotal {
                        day: d.to_string(),
                        total: if *d == "Thursday" { 18.0 } else { 0.0 },
                    })
                    .collect(),
                top_products_by_quantity: vec![RankedTotal {
                    label: "LANTERN".to_string(),
                    total: 6.0,
                }],
                top_countries_by_quantity: vec![RankedTotal {
                    label: "Germany".to_string(),
                    total: 6.0,
                }],
            },
            outliers: OutlierReport::default(),
            charts: vec!["outputs/weekday_sales.svg".into()],
            duration_ms: 12,
        }
    }
}
