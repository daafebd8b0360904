//! Configuration types for the analysis pipeline.
//!
//! Analytical settings live in [`AnalysisConfig`]; everything that only
//! affects how charts look lives in [`DisplayConfig`] so the statistics never
//! depend on presentation choices.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default input file, read from the working directory.
pub const DEFAULT_INPUT_PATH: &str = "Online Retail.xlsx";

/// Default directory for charts and JSON reports.
pub const DEFAULT_OUTPUT_DIR: &str = "./outputs";

/// Presentation settings for rendered charts.
///
/// Clipping is applied to axis ranges only; the underlying table is never
/// filtered by these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Quantile at which quantity/price axes are cut off (0.0 - 1.0].
    /// Default: 0.99
    pub clip_quantile: f64,

    /// Number of bins for histograms.
    /// Default: 50
    pub histogram_bins: usize,

    /// Chart width in pixels.
    /// Default: 1000
    pub chart_width: u32,

    /// Chart height in pixels.
    /// Default: 600
    pub chart_height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            clip_quantile: 0.99,
            histogram_bins: 50,
            chart_width: 1000,
            chart_height: 600,
        }
    }
}

impl DisplayConfig {
    /// Validate the display settings.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.clip_quantile > 0.0 && self.clip_quantile <= 1.0) {
            return Err(ConfigValidationError::InvalidQuantile(self.clip_quantile));
        }
        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidBinCount(self.histogram_bins));
        }
        if self.chart_width == 0 || self.chart_height == 0 {
            return Err(ConfigValidationError::InvalidChartSize {
                width: self.chart_width,
                height: self.chart_height,
            });
        }
        Ok(())
    }
}

/// Configuration for the analysis pipeline.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use retail_eda::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .input_path("data/online_retail.csv")
///     .top_n(5)
///     .clip_quantile(0.95)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Path of the transaction log.
    /// Default: "Online Retail.xlsx"
    pub input_path: PathBuf,

    /// Directory that receives charts and reports.
    /// Default: "./outputs"
    pub output_dir: PathBuf,

    /// Size of every top-N ranking (countries, products).
    /// Default: 10
    pub top_n: usize,

    /// Whether charts are rendered at all.
    /// Default: true
    pub render_charts: bool,

    /// Chart presentation settings.
    pub display: DisplayConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            top_n: 10,
            render_charts: true,
            display: DisplayConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.top_n == 0 {
            return Err(ConfigValidationError::InvalidTopN(self.top_n));
        }
        self.display.validate()
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid clip quantile: {0} (must be in (0.0, 1.0])")]
    InvalidQuantile(f64),

    #[error("Invalid histogram bin count: {0} (must be at least 1)")]
    InvalidBinCount(usize),

    #[error("Invalid top-N size: {0} (must be at least 1)")]
    InvalidTopN(usize),

    #[error("Invalid chart size: {width}x{height}")]
    InvalidChartSize { width: u32, height: u32 },
}

impl From<ConfigValidationError> for crate::error::AnalysisError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::AnalysisError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    input_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    top_n: Option<usize>,
    render_charts: Option<bool>,
    clip_quantile: Option<f64>,
    histogram_bins: Option<usize>,
    chart_size: Option<(u32, u32)>,
}

impl AnalysisConfigBuilder {
    /// Set the path of the transaction log.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the output directory for charts and reports.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the size of the top-N rankings.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Enable or disable chart rendering.
    pub fn render_charts(mut self, render: bool) -> Self {
        self.render_charts = Some(render);
        self
    }

    /// Set the axis clipping quantile for charts.
    ///
    /// # Arguments
    /// * `quantile` - Value in (0.0, 1.0] (e.g., 0.99 = 99th percentile)
    pub fn clip_quantile(mut self, quantile: f64) -> Self {
        self.clip_quantile = Some(quantile);
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the chart size in pixels.
    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_size = Some((width, height));
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = DisplayConfig::default();
        let (chart_width, chart_height) = self
            .chart_size
            .unwrap_or((defaults.chart_width, defaults.chart_height));

        let config = AnalysisConfig {
            input_path: self
                .input_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_PATH)),
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            top_n: self.top_n.unwrap_or(10),
            render_charts: self.render_charts.unwrap_or(true),
            display: DisplayConfig {
                clip_quantile: self.clip_quantile.unwrap_or(defaults.clip_quantile),
                histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
                chart_width,
                chart_height,
            },
        };

        config.validate()?;
        Ok(config)
    }
}
