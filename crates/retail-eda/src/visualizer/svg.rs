//! SVG chart rendering with plotters.

use super::{BoxStats, ChartKind, ChartRenderer, ChartSpec, HistogramBin};
use crate::config::DisplayConfig;
use anyhow::{Result, bail};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

type Canvas<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Writes each chart to `<out_dir>/<name>.svg`.
#[derive(Debug, Clone, Copy)]
pub struct SvgChartRenderer {
    width: u32,
    height: u32,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self::from_display(&DisplayConfig::default())
    }
}

impl SvgChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn from_display(display: &DisplayConfig) -> Self {
        Self::new(display.chart_width, display.chart_height)
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, chart: &ChartSpec, out_dir: &Path) -> Result<PathBuf> {
        if chart.is_empty() {
            bail!("chart '{}' has no data to draw", chart.name);
        }

        let path = out_dir.join(format!("{}.svg", chart.name));
        {
            let root = SVGBackend::new(&path, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE)?;

            match &chart.kind {
                ChartKind::Histogram { bins, .. } => {
                    let labels = bin_labels(bins);
                    let counts: Vec<f64> = bins.iter().map(|b| b.count as f64).collect();
                    draw_bars(&root, chart, &labels, &counts, 10)?;
                }
                ChartKind::Bar { labels, values } => {
                    draw_bars(&root, chart, labels, values, labels.len())?;
                }
                ChartKind::Scatter {
                    points,
                    x_max,
                    y_max,
                } => draw_scatter(&root, chart, points, *x_max, *y_max)?,
                ChartKind::BoxPlot {
                    stats,
                    y_min,
                    y_max,
                } => {
                    let Some(stats) = stats else {
                        bail!("chart '{}' has no data to draw", chart.name);
                    };
                    draw_box(&root, chart, stats, *y_min, *y_max)?;
                }
            }

            root.present()?;
        }

        debug!("Chart saved to {}", path.display());
        Ok(path)
    }
}

fn bin_labels(bins: &[HistogramBin]) -> Vec<String> {
    bins.iter().map(|b| format!("{:.1}", b.lower)).collect()
}

fn padded_max(max: f64) -> f64 {
    if max > 0.0 { max * 1.05 } else { 1.0 }
}

fn draw_bars(
    root: &Canvas<'_>,
    chart: &ChartSpec,
    labels: &[String],
    values: &[f64],
    max_labels: usize,
) -> Result<()> {
    let n = values.len() as u32;
    let y_max = padded_max(values.iter().copied().fold(0.0, f64::max));

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d((0u32..n).into_segmented(), 0f64..y_max)?;

    let formatter = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            labels.get(*i as usize).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    };

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(max_labels.max(1))
        .x_label_formatter(&formatter)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    ctx.draw_series(
        Histogram::vertical(&ctx)
            .style(BLUE.mix(0.6).filled())
            .margin(2)
            .data(values.iter().enumerate().map(|(i, v)| (i as u32, *v))),
    )?;

    Ok(())
}

fn draw_scatter(
    root: &Canvas<'_>,
    chart: &ChartSpec,
    points: &[(f64, f64)],
    x_max: f64,
    y_max: f64,
) -> Result<()> {
    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..padded_max(x_max), 0f64..padded_max(y_max))?;

    ctx.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    ctx.draw_series(
        points
            .iter()
            .map(|(x, y)| Circle::new((*x, *y), 2, BLUE.mix(0.4).filled())),
    )?;

    Ok(())
}

fn draw_box(
    root: &Canvas<'_>,
    chart: &ChartSpec,
    stats: &BoxStats,
    y_min: f64,
    y_max: f64,
) -> Result<()> {
    let y_max = if y_max > y_min { y_max } else { y_min + 1.0 };
    let clamp = |v: f64| v.clamp(y_min, y_max);

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..1f64, y_min..y_max)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    let (q1, median, q3) = (clamp(stats.q1), clamp(stats.median), clamp(stats.q3));
    let (low, high) = (clamp(stats.whisker_low), clamp(stats.whisker_high));

    ctx.draw_series(std::iter::once(Rectangle::new(
        [(0.3, q1), (0.7, q3)],
        BLUE.mix(0.3).filled(),
    )))?;
    ctx.draw_series(std::iter::once(Rectangle::new(
        [(0.3, q1), (0.7, q3)],
        BLACK.stroke_width(1),
    )))?;
    ctx.draw_series(std::iter::once(PathElement::new(
        vec![(0.3, median), (0.7, median)],
        RED.stroke_width(2),
    )))?;

    // whiskers and caps
    ctx.draw_series(
        [
            vec![(0.5, q3), (0.5, high)],
            vec![(0.5, q1), (0.5, low)],
            vec![(0.4, high), (0.6, high)],
            vec![(0.4, low), (0.6, low)],
        ]
        .into_iter()
        .map(|line| PathElement::new(line, BLACK.stroke_width(1))),
    )?;

    ctx.draw_series(
        stats
            .fliers
            .iter()
            .filter(|v| **v >= y_min && **v <= y_max)
            .map(|v| Circle::new((0.5, *v), 3, BLACK.stroke_width(1))),
    )?;

    Ok(())
}
