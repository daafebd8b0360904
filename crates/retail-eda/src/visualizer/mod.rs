//! Chart construction for the cleaned table.
//!
//! [`Visualizer::build_charts`] turns the cleaned table and its summary into
//! renderer-independent [`ChartSpec`] values; a [`ChartRenderer`] writes them
//! out. Quantity and unit-price axes are limited to the configured display
//! quantile. The limit only hides values from the chart; nothing is removed
//! from the data.

mod svg;

pub use svg::SvgChartRenderer;

use crate::columns;
use crate::config::DisplayConfig;
use crate::types::SalesSummary;
use crate::utils::{column_f64, column_values, quantile_sorted, sorted};
use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Largest number of points drawn in a scatter chart. Larger inputs are
/// thinned by taking every k-th point.
pub const MAX_SCATTER_POINTS: usize = 20_000;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One histogram bucket, `[lower, upper)` (the last bucket is closed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Five-number summary drawn by a box plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Lowest value within `Q1 - 1.5*IQR`
    pub whisker_low: f64,
    /// Highest value within `Q3 + 1.5*IQR`
    pub whisker_high: f64,
    /// Values beyond the whiskers that fall inside the display range
    pub fliers: Vec<f64>,
}

/// What a chart shows, independent of how it is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartKind {
    Histogram {
        bins: Vec<HistogramBin>,
        /// Values above the display limit, left out of the bins
        hidden: usize,
    },
    Bar {
        labels: Vec<String>,
        values: Vec<f64>,
    },
    Scatter {
        points: Vec<(f64, f64)>,
        x_max: f64,
        y_max: f64,
    },
    BoxPlot {
        stats: Option<BoxStats>,
        y_min: f64,
        y_max: f64,
    },
}

/// A chart ready to be rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// File stem, e.g. `quantity_histogram`
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
}

impl ChartSpec {
    fn new(name: &str, title: &str, x_label: &str, y_label: &str, kind: ChartKind) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            kind,
        }
    }

    /// Whether there is anything to draw.
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            ChartKind::Histogram { bins, .. } => bins.is_empty(),
            ChartKind::Bar { values, .. } => values.is_empty(),
            ChartKind::Scatter { points, .. } => points.is_empty(),
            ChartKind::BoxPlot { stats, .. } => stats.is_none(),
        }
    }
}

/// Renders a [`ChartSpec`] to a file.
pub trait ChartRenderer: Send + Sync {
    /// Render `chart` into `out_dir` and return the written path.
    fn render(&self, chart: &ChartSpec, out_dir: &Path) -> Result<PathBuf>;
}

/// Builds the fixed chart set.
#[derive(Debug, Clone, Default)]
pub struct Visualizer {
    display: DisplayConfig,
}

impl Visualizer {
    pub fn new(display: DisplayConfig) -> Self {
        Self { display }
    }

    /// Build the eight charts, in display order.
    pub fn build_charts(&self, df: &DataFrame, summary: &SalesSummary) -> Result<Vec<ChartSpec>> {
        let quantity = column_values(df, columns::QUANTITY)?;
        let price = column_values(df, columns::UNIT_PRICE)?;
        let q = self.display.clip_quantile;
        let quantity_limit = display_limit(&quantity, q);
        let price_limit = display_limit(&price, q);
        debug!(
            "Display limits at q={}: quantity <= {:?}, unit price <= {:?}",
            q, quantity_limit, price_limit
        );

        let bins = self.display.histogram_bins;
        let country_labels = summary.sales_by_country.iter().map(|r| r.label.clone());
        let country_values = summary.sales_by_country.iter().map(|r| r.total);

        let charts = vec![
            ChartSpec::new(
                "quantity_histogram",
                "Distribution of Quantity",
                columns::QUANTITY,
                "Frequency",
                histogram(&quantity, quantity_limit, bins),
            ),
            ChartSpec::new(
                "unit_price_histogram",
                "Distribution of Unit Price",
                columns::UNIT_PRICE,
                "Frequency",
                histogram(&price, price_limit, bins),
            ),
            ChartSpec::new(
                "top_countries_sales",
                "Top Countries by Total Sales",
                columns::COUNTRY,
                "Total Sales",
                ChartKind::Bar {
                    labels: country_labels.collect(),
                    values: country_values.collect(),
                },
            ),
            ChartSpec::new(
                "price_vs_quantity",
                "Unit Price vs Quantity",
                columns::UNIT_PRICE,
                columns::QUANTITY,
                scatter(df, price_limit, quantity_limit)?,
            ),
            ChartSpec::new(
                "monthly_sales",
                "Total Sales per Month",
                columns::MONTH,
                "Total Sales",
                ChartKind::Bar {
                    labels: summary
                        .monthly_sales
                        .iter()
                        .map(|m| month_name(m.month).to_string())
                        .collect(),
                    values: summary.monthly_sales.iter().map(|m| m.total).collect(),
                },
            ),
            ChartSpec::new(
                "weekday_sales",
                "Total Sales per Day of Week",
                "Day of Week",
                "Total Sales",
                ChartKind::Bar {
                    labels: summary.weekday_sales.iter().map(|d| d.day.clone()).collect(),
                    values: summary.weekday_sales.iter().map(|d| d.total).collect(),
                },
            ),
            ChartSpec::new(
                "quantity_boxplot",
                "Box Plot of Quantity",
                "",
                columns::QUANTITY,
                box_plot(&quantity, quantity_limit),
            ),
            ChartSpec::new(
                "unit_price_boxplot",
                "Box Plot of Unit Price",
                "",
                columns::UNIT_PRICE,
                box_plot(&price, price_limit),
            ),
        ];

        Ok(charts)
    }
}

/// Three-letter name of a month (1-12).
pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[month as usize - 1],
        _ => "?",
    }
}

fn display_limit(values: &[f64], q: f64) -> Option<f64> {
    quantile_sorted(&sorted(values), q)
}

/// Equal-width bins over `[0, limit]`; values above `limit` are hidden.
pub fn histogram(values: &[f64], limit: Option<f64>, bins: usize) -> ChartKind {
    let Some(limit) = limit else {
        return ChartKind::Histogram {
            bins: Vec::new(),
            hidden: 0,
        };
    };

    let shown: Vec<f64> = values.iter().copied().filter(|v| *v <= limit).collect();
    let hidden = values.len() - shown.len();
    // axis starts at zero unless the data goes below it
    let lower = shown.iter().copied().fold(0.0, f64::min);
    let bins = bins.max(1);

    if shown.is_empty() {
        return ChartKind::Histogram {
            bins: Vec::new(),
            hidden,
        };
    }

    let width = (limit - lower) / bins as f64;
    if width <= 0.0 {
        return ChartKind::Histogram {
            bins: vec![HistogramBin {
                lower,
                upper: limit,
                count: shown.len(),
            }],
            hidden,
        };
    }

    let mut counts = vec![0usize; bins];
    for v in &shown {
        let idx = (((v - lower) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lower + width * i as f64,
            upper: lower + width * (i + 1) as f64,
            count,
        })
        .collect();

    ChartKind::Histogram { bins, hidden }
}

fn scatter(df: &DataFrame, x_limit: Option<f64>, y_limit: Option<f64>) -> Result<ChartKind> {
    let (Some(x_max), Some(y_max)) = (x_limit, y_limit) else {
        return Ok(ChartKind::Scatter {
            points: Vec::new(),
            x_max: 0.0,
            y_max: 0.0,
        });
    };

    let xs = column_f64(df, columns::UNIT_PRICE)?;
    let ys = column_f64(df, columns::QUANTITY)?;
    let inside: Vec<(f64, f64)> = xs
        .into_iter()
        .zip(ys)
        .filter_map(|(x, y)| Some((x?, y?)))
        .filter(|(x, y)| *x <= x_max && *y <= y_max)
        .collect();

    let step = inside.len().div_ceil(MAX_SCATTER_POINTS).max(1);
    let points = inside.into_iter().step_by(step).collect();

    Ok(ChartKind::Scatter {
        points,
        x_max,
        y_max,
    })
}

/// Box plot with Tukey whiskers; the y-axis stops at `limit`.
pub fn box_plot(values: &[f64], limit: Option<f64>) -> ChartKind {
    let sorted = sorted(values);
    let stats = match (
        quantile_sorted(&sorted, 0.25),
        quantile_sorted(&sorted, 0.5),
        quantile_sorted(&sorted, 0.75),
    ) {
        (Some(q1), Some(median), Some(q3)) => {
            let iqr = q3 - q1;
            let low_fence = q1 - 1.5 * iqr;
            let high_fence = q3 + 1.5 * iqr;
            let inside = sorted.iter().filter(|v| **v >= low_fence && **v <= high_fence);
            let whisker_low = inside.clone().next().copied().unwrap_or(q1);
            let whisker_high = inside.last().copied().unwrap_or(q3);
            let ceiling = limit.unwrap_or(f64::INFINITY);
            let fliers = sorted
                .iter()
                .copied()
                .filter(|v| (*v < low_fence || *v > high_fence) && *v <= ceiling)
                .collect();
            Some(BoxStats {
                q1,
                median,
                q3,
                whisker_low,
                whisker_high,
                fliers,
            })
        }
        _ => None,
    };

    let y_min = sorted.first().copied().unwrap_or(0.0).min(0.0);
    let y_max = limit.unwrap_or(y_min).max(y_min);
    ChartKind::BoxPlot {
        stats,
        y_min,
        y_max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::Summarizer;

    fn cleaned() -> DataFrame {
        let n = 100;
        let quantity: Vec<f64> = (1..=n).map(|v| v as f64).collect();
        let price: Vec<f64> = (1..=n).map(|v| v as f64 / 10.0).collect();
        let total: Vec<f64> = quantity.iter().zip(&price).map(|(q, p)| q * p).collect();
        let countries: Vec<&str> = (0..n)
            .map(|i| if i % 2 == 0 { "France" } else { "Spain" })
            .collect();
        let months: Vec<i32> = (0..n).map(|i| (i % 12) as i32 + 1).collect();
        let days: Vec<&str> = (0..n).map(|i| crate::cleaner::WEEKDAYS[i % 5]).collect();
        let descriptions: Vec<String> = (0..n).map(|i| format!("ITEM {}", i % 7)).collect();
        df![
            "Description" => descriptions,
            "Quantity" => quantity,
            "UnitPrice" => price,
            "Country" => countries,
            "TotalSales" => total,
            "Month" => months,
            "DayOfWeek" => days,
        ]
        .unwrap()
    }

    fn charts() -> Vec<ChartSpec> {
        let df = cleaned();
        let summary = Summarizer::default().summarize(&df).unwrap();
        Visualizer::default().build_charts(&df, &summary).unwrap()
    }

    #[test]
    fn test_builds_fixed_chart_set() {
        let names: Vec<String> = charts().into_iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                "quantity_histogram",
                "unit_price_histogram",
                "top_countries_sales",
                "price_vs_quantity",
                "monthly_sales",
                "weekday_sales",
                "quantity_boxplot",
                "unit_price_boxplot",
            ]
        );
    }

    #[test]
    fn test_histogram_hides_values_above_limit() {
        let charts = charts();
        let ChartKind::Histogram { bins, hidden } = &charts[0].kind else {
            panic!("expected histogram");
        };
        // 99th percentile of 1..=100 is 99.01, so only 100 is hidden
        assert_eq!(*hidden, 1);
        assert_eq!(bins.len(), 50);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 99);
    }

    #[test]
    fn test_weekday_chart_has_seven_bars() {
        let charts = charts();
        let ChartKind::Bar { labels, values } = &charts[5].kind else {
            panic!("expected bar chart");
        };
        assert_eq!(labels.len(), 7);
        assert_eq!(labels[0], "Monday");
        assert_eq!(values[5], 0.0);
        assert_eq!(values[6], 0.0);
    }

    #[test]
    fn test_monthly_chart_uses_month_names() {
        let charts = charts();
        let ChartKind::Bar { labels, .. } = &charts[4].kind else {
            panic!("expected bar chart");
        };
        assert_eq!(labels.first().map(String::as_str), Some("Jan"));
        assert_eq!(labels.last().map(String::as_str), Some("Dec"));
    }

    #[test]
    fn test_scatter_respects_limits() {
        let charts = charts();
        let ChartKind::Scatter { points, x_max, y_max } = &charts[3].kind else {
            panic!("expected scatter");
        };
        assert!(points.iter().all(|(x, y)| x <= x_max && y <= y_max));
        assert_eq!(points.len(), 99);
    }

    #[test]
    fn test_histogram_of_constant_values() {
        let ChartKind::Histogram { bins, hidden } = histogram(&[3.0; 4], Some(3.0), 10) else {
            panic!("expected histogram");
        };
        assert_eq!(hidden, 0);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[9].count, 4);

        let ChartKind::Histogram { bins, .. } = histogram(&[0.0; 3], Some(0.0), 10) else {
            panic!("expected histogram");
        };
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
    }

    #[test]
    fn test_box_plot_whiskers_and_fliers() {
        let mut values: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        values.push(100.0);
        let ChartKind::BoxPlot { stats, .. } = box_plot(&values, None) else {
            panic!("expected box plot");
        };
        let stats = stats.unwrap();
        assert_eq!(stats.median, 6.0);
        assert_eq!(stats.whisker_low, 1.0);
        assert_eq!(stats.whisker_high, 10.0);
        assert_eq!(stats.fliers, vec![100.0]);
    }

    #[test]
    fn test_empty_table_gives_empty_charts() {
        let df = cleaned().head(Some(0));
        let summary = Summarizer::default().summarize(&df).unwrap();
        let charts = Visualizer::default().build_charts(&df, &summary).unwrap();
        assert_eq!(charts.len(), 8);
        assert!(charts[0].is_empty());
        assert!(charts[3].is_empty());
        assert!(charts[6].is_empty());
        // weekday totals are zero-filled, so the bar chart still has bars
        assert!(!charts[5].is_empty());
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), "Jan");
        assert_eq!(month_name(12), "Dec");
        assert_eq!(month_name(13), "?");
    }
}
