//! Plain-text report, in the order the analysis runs.

use crate::types::{AnalysisResult, ColumnDescription, RankedTotal};
use crate::visualizer::month_name;
use std::io::{self, Write};

const RULE: &str = "------------------------------------------------------------";

/// Writes the fixed text report.
#[derive(Debug, Clone, Copy)]
pub struct TextReporter {
    /// Width of the label column in tables
    label_width: usize,
}

impl Default for TextReporter {
    fn default() -> Self {
        Self { label_width: 36 }
    }
}

impl TextReporter {
    pub fn new(label_width: usize) -> Self {
        Self { label_width }
    }

    /// Write every section of the report to `out`.
    pub fn write_report<W: Write>(&self, out: &mut W, result: &AnalysisResult) -> io::Result<()> {
        section(out, "First 5 rows of the dataset")?;
        writeln!(out, "{}", result.preview)?;

        section(out, "Missing values in each column")?;
        for m in &result.cleaning.missing_values {
            writeln!(out, "{:<w$} {:>10}", m.column, m.missing, w = self.label_width)?;
        }

        section(out, "Cleaning")?;
        for action in &result.cleaning.actions {
            writeln!(out, "- {action}")?;
        }
        writeln!(
            out,
            "Rows: {} -> {} ({} removed)",
            result.cleaning.rows_before,
            result.cleaning.rows_after,
            result.cleaning.rows_removed()
        )?;
        writeln!(out, "Number of duplicate rows: {}", result.cleaning.duplicates_removed)?;

        section(out, "Basic statistics of numerical columns")?;
        self.write_descriptions(out, &result.summary.descriptions)?;

        section(out, "Top countries by total sales")?;
        self.write_ranking(out, &result.summary.sales_by_country)?;

        section(out, "Total sales per month")?;
        for m in &result.summary.monthly_sales {
            writeln!(out, "{:<w$} {:>16.2}", month_name(m.month), m.total, w = self.label_width)?;
        }

        section(out, "Total sales per day of week")?;
        for d in &result.summary.weekday_sales {
            writeln!(out, "{:<w$} {:>16.2}", d.day, d.total, w = self.label_width)?;
        }

        section(out, "Top products by quantity sold")?;
        self.write_ranking(out, &result.summary.top_products_by_quantity)?;

        section(out, "Top countries by quantity sold")?;
        self.write_ranking(out, &result.summary.top_countries_by_quantity)?;

        section(out, "Outliers (1.5 x IQR)")?;
        for f in &result.outliers.fences {
            writeln!(
                out,
                "{:<12} Q1={:.2} Q3={:.2} fences=[{:.2}, {:.2}] outliers={}",
                f.column, f.q1, f.q3, f.lower, f.upper, f.outliers
            )?;
        }
        writeln!(out, "Number of rows with outliers: {}", result.outliers.rows_flagged)?;

        if !result.charts.is_empty() {
            section(out, "Charts")?;
            for chart in &result.charts {
                writeln!(out, "- {}", chart.display())?;
            }
        }

        section(out, "Summary of Findings")?;
        for line in super::findings(result) {
            writeln!(out, "- {line}")?;
        }

        Ok(())
    }

    /// Render the report into a string.
    pub fn render(&self, result: &AnalysisResult) -> String {
        let mut buf = Vec::new();
        // writing into a Vec cannot fail
        let _ = self.write_report(&mut buf, result);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn write_descriptions<W: Write>(
        &self,
        out: &mut W,
        descriptions: &[ColumnDescription],
    ) -> io::Result<()> {
        write!(out, "{:<8}", "")?;
        for d in descriptions {
            write!(out, " {:>14}", d.column)?;
        }
        writeln!(out)?;

        write!(out, "{:<8}", "count")?;
        for d in descriptions {
            write!(out, " {:>14}", d.count)?;
        }
        writeln!(out)?;

        let rows: [(&str, fn(&ColumnDescription) -> Option<f64>); 7] = [
            ("mean", |d| d.mean),
            ("std", |d| d.std),
            ("min", |d| d.min),
            ("25%", |d| d.q25),
            ("50%", |d| d.median),
            ("75%", |d| d.q75),
            ("max", |d| d.max),
        ];
        for (label, get) in rows {
            write!(out, "{label:<8}")?;
            for d in descriptions {
                match get(d) {
                    Some(v) => write!(out, " {:>14.3}", v)?,
                    None => write!(out, " {:>14}", "NaN")?,
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn write_ranking<W: Write>(&self, out: &mut W, ranking: &[RankedTotal]) -> io::Result<()> {
        if ranking.is_empty() {
            return writeln!(out, "(no data)");
        }
        for r in ranking {
            let label: String = r.label.chars().take(self.label_width).collect();
            writeln!(out, "{:<w$} {:>16.2}", label, r.total, w = self.label_width)?;
        }
        Ok(())
    }
}

fn section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{RULE}")
}
