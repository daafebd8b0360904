//! Main analysis pipeline module.
//!
//! This module provides the [`Pipeline`] struct and its builder, which wire
//! loading, cleaning, summarizing, charting and outlier detection together.

use crate::cleaner::DataCleaner;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::loader::DataLoader;
use crate::pipeline::outliers::OutlierDetector;
use crate::pipeline::progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::summary::Summarizer;
use crate::types::{AnalysisResult, SalesSummary};
use crate::visualizer::{ChartRenderer, SvgChartRenderer, Visualizer};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Number of raw rows shown in the preview.
const PREVIEW_ROWS: usize = 5;

/// The analysis pipeline.
///
/// Use [`Pipeline::builder()`] to create a pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use retail_eda::{AnalysisConfig, Pipeline};
///
/// let config = AnalysisConfig::builder()
///     .input_path("Online Retail.csv")
///     .output_dir("outputs")
///     .build()?;
///
/// let result = Pipeline::builder()
///     .config(config)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run()?;
/// ```
pub struct Pipeline {
    config: AnalysisConfig,
    renderer: Arc<dyn ChartRenderer>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: DataCleaner,
    summarizer: Summarizer,
    visualizer: Visualizer,
    detector: OutlierDetector,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load the configured input file and analyze it.
    pub fn run(&self) -> Result<AnalysisResult> {
        self.run_from_path(&self.config.input_path)
    }

    /// Load `path` and analyze it.
    ///
    /// # Errors
    ///
    /// Load failures ([`AnalysisError::FileError`], [`AnalysisError::FormatError`])
    /// are returned before any analysis runs.
    pub fn run_from_path(&self, path: impl AsRef<Path>) -> Result<AnalysisResult> {
        let start_time = Instant::now();
        let path = path.as_ref();

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Loading,
            0.0,
            format!("Loading {}", path.display()),
        ));

        let df = match DataLoader::load(path) {
            Ok(df) => df,
            Err(e) => return Err(self.fail(e)),
        };

        self.finish(self.process_internal(df, start_time))
    }

    /// Analyze an already-loaded raw table.
    pub fn process(&self, df: DataFrame) -> Result<AnalysisResult> {
        let start_time = Instant::now();

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Loading,
            0.0,
            format!("Validating table of {} rows", df.height()),
        ));

        let df = match DataLoader::validate(df) {
            Ok(df) => df,
            Err(e) => return Err(self.fail(e)),
        };
        self.finish(self.process_internal(df, start_time))
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn fail(&self, e: AnalysisError) -> AnalysisError {
        self.report_progress(ProgressUpdate::failed(e.to_string()));
        error!("Pipeline error: {}", e);
        e
    }

    fn finish(&self, result: Result<AnalysisResult>) -> Result<AnalysisResult> {
        match result {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Analysis completed successfully"));
                Ok(result)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn process_internal(&self, df: DataFrame, start_time: Instant) -> Result<AnalysisResult> {
        info!("Starting analysis of {} rows x {} columns", df.height(), df.width());
        let preview = DataLoader::preview(&df, PREVIEW_ROWS);

        // Cleaning
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            0.0,
            "Removing invalid rows...",
        ));
        let (cleaned, cleaning) = self
            .cleaner
            .clean(&df)
            .map_err(|e| AnalysisError::CleaningFailed(e.to_string()))?;
        drop(df);

        // Summary statistics
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Summarizing,
            0.0,
            "Computing statistics and aggregates...",
        ));
        let summary = self
            .summarizer
            .summarize(&cleaned)
            .map_err(|e| AnalysisError::SummaryFailed(e.to_string()))?;

        // Charts
        let charts = if self.config.render_charts {
            self.render_charts(&cleaned, &summary)?
        } else {
            debug!("Chart rendering disabled");
            Vec::new()
        };

        // Outliers
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::OutlierDetection,
            0.0,
            "Detecting outliers...",
        ));
        let outliers = self
            .detector
            .detect(&cleaned)
            .map_err(|e| AnalysisError::OutlierDetectionFailed(e.to_string()))?;
        info!(
            "Outlier detection complete: {} of {} rows flagged",
            outliers.rows_flagged, outliers.rows_checked
        );

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Reporting,
            0.0,
            "Assembling results...",
        ));

        Ok(AnalysisResult {
            preview,
            cleaning,
            summary,
            outliers,
            charts,
            duration_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    fn render_charts(&self, cleaned: &DataFrame, summary: &SalesSummary) -> Result<Vec<PathBuf>> {
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Visualizing,
            0.0,
            "Building charts...",
        ));

        let specs = self
            .visualizer
            .build_charts(cleaned, summary)
            .map_err(|e| AnalysisError::ChartRenderingFailed {
                chart: "all".to_string(),
                reason: e.to_string(),
            })?;

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| AnalysisError::file(&self.config.output_dir, e))?;

        let total = specs.len();
        let mut written = Vec::with_capacity(total);
        for (i, spec) in specs.iter().enumerate() {
            self.report_progress(ProgressUpdate::with_items(
                AnalysisStage::Visualizing,
                spec.name.clone(),
                i,
                total,
                format!("Rendering {}", spec.title),
            ));

            if spec.is_empty() {
                warn!("Skipping chart '{}': no data to draw", spec.name);
                continue;
            }

            let path = self
                .renderer
                .render(spec, &self.config.output_dir)
                .map_err(|e| AnalysisError::ChartRenderingFailed {
                    chart: spec.name.clone(),
                    reason: e.to_string(),
                })?;
            written.push(path);
        }

        info!(
            "Rendered {} charts into {}",
            written.len(),
            self.config.output_dir.display()
        );
        Ok(written)
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<AnalysisConfig>,
    renderer: Option<Arc<dyn ChartRenderer>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the chart renderer (SVG files by default).
    pub fn renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Set a progress reporter for receiving updates during the run.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let renderer = self
            .renderer
            .unwrap_or_else(|| Arc::new(SvgChartRenderer::from_display(&config.display)));

        Ok(Pipeline {
            summarizer: Summarizer::new(config.top_n),
            visualizer: Visualizer::new(config.display.clone()),
            detector: OutlierDetector::default(),
            cleaner: DataCleaner,
            renderer,
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizer::ChartSpec;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Renderer that records chart names instead of drawing.
    #[derive(Default)]
    struct RecordingRenderer {
        names: Mutex<Vec<String>>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(&self, chart: &ChartSpec, out_dir: &Path) -> anyhow::Result<PathBuf> {
            self.names.lock().unwrap().push(chart.name.clone());
            Ok(out_dir.join(format!("{}.svg", chart.name)))
        }
    }

    struct FailingRenderer;

    impl ChartRenderer for FailingRenderer {
        fn render(&self, _chart: &ChartSpec, _out_dir: &Path) -> anyhow::Result<PathBuf> {
            anyhow::bail!("backend unavailable")
        }
    }

    fn raw_frame() -> DataFrame {
        df![
            "InvoiceNo" => ["536365", "536365", "536366", "536367", "536367", "536368"],
            "StockCode" => ["85123A", "71053", "22633", "84879", "84879", "22960"],
            "Description" => ["WHITE HEART", "LANTERN", "HAND WARMER", "BIRD", "BIRD", "JAM SET"],
            "Quantity" => [6i64, 6, 6, 32, 32, -1],
            "InvoiceDate" => [
                "12/1/2010 8:26",
                "12/1/2010 8:26",
                "12/1/2010 8:28",
                "12/1/2010 8:34",
                "12/1/2010 8:34",
                "12/1/2010 8:34",
            ],
            "UnitPrice" => [2.55f64, 3.39, 1.85, 1.69, 1.69, 4.25],
            "CustomerID" => [
                Some(17850i64),
                Some(17850),
                None,
                Some(13047),
                Some(13047),
                Some(13047),
            ],
            "Country" => [
                "United Kingdom",
                "United Kingdom",
                "France",
                "France",
                "France",
                "France",
            ],
        ]
        .unwrap()
    }

    fn config(dir: &Path) -> AnalysisConfig {
        AnalysisConfig::builder().output_dir(dir).build().unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config().top_n, 10);
        assert!(pipeline.config().render_charts);
        assert!(pipeline.progress_reporter.is_none());
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = AnalysisConfig {
            top_n: 0,
            ..Default::default()
        };
        assert!(Pipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_process_end_to_end() {
        let dir = TempDir::new().unwrap();
        let renderer = Arc::new(RecordingRenderer::default());
        let pipeline = Pipeline::builder()
            .config(config(dir.path()))
            .renderer(renderer.clone())
            .build()
            .unwrap();

        let result = pipeline.process(raw_frame()).unwrap();

        assert_eq!(result.cleaning.rows_before, 6);
        assert_eq!(result.cleaning.missing_customer_removed, 1);
        assert_eq!(result.cleaning.non_positive_quantity_removed, 1);
        assert_eq!(result.cleaning.duplicates_removed, 1);
        assert_eq!(result.cleaning.rows_after, 3);
        assert!(result.preview.contains("InvoiceNo"));

        // 2010-12-01 was a Wednesday
        let wednesday = &result.summary.weekday_sales[2];
        assert_eq!(wednesday.day, "Wednesday");
        let expected = 6.0 * 2.55 + 6.0 * 3.39 + 32.0 * 1.69;
        assert!((wednesday.total - expected).abs() < 1e-9);

        assert_eq!(renderer.names.lock().unwrap().len(), 8);
        assert_eq!(result.charts.len(), 8);
        assert_eq!(result.outliers.rows_checked, 3);
    }

    #[test]
    fn test_charts_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let renderer = Arc::new(RecordingRenderer::default());
        let config = AnalysisConfig::builder()
            .output_dir(dir.path())
            .render_charts(false)
            .build()
            .unwrap();

        let result = Pipeline::builder()
            .config(config)
            .renderer(renderer.clone())
            .build()
            .unwrap()
            .process(raw_frame())
            .unwrap();

        assert!(result.charts.is_empty());
        assert!(renderer.names.lock().unwrap().is_empty());
    }

    #[test]
    fn test_progress_stages_in_order() {
        let dir = TempDir::new().unwrap();
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = stages.clone();

        Pipeline::builder()
            .config(config(dir.path()))
            .renderer(Arc::new(RecordingRenderer::default()))
            .on_progress(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap()
            .process(raw_frame())
            .unwrap();

        let mut seen = stages.lock().unwrap().clone();
        seen.dedup();
        assert_eq!(
            seen,
            vec![
                AnalysisStage::Loading,
                AnalysisStage::Cleaning,
                AnalysisStage::Summarizing,
                AnalysisStage::Visualizing,
                AnalysisStage::OutlierDetection,
                AnalysisStage::Reporting,
                AnalysisStage::Complete,
            ]
        );
    }

    #[test]
    fn test_renderer_failure_is_typed() {
        let dir = TempDir::new().unwrap();
        let failed = Arc::new(Mutex::new(false));
        let flag = failed.clone();

        let err = Pipeline::builder()
            .config(config(dir.path()))
            .renderer(Arc::new(FailingRenderer))
            .on_progress(move |update| {
                if update.stage == AnalysisStage::Failed {
                    *flag.lock().unwrap() = true;
                }
            })
            .build()
            .unwrap()
            .process(raw_frame())
            .unwrap_err();

        assert_eq!(err.error_code(), "CHART_RENDERING_FAILED");
        assert!(err.to_string().contains("quantity_histogram"));
        assert!(*failed.lock().unwrap());
    }

    #[test]
    fn test_missing_file_is_load_failure() {
        let dir = TempDir::new().unwrap();
        let pipeline = Pipeline::builder().config(config(dir.path())).build().unwrap();

        let err = pipeline.run_from_path(dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, AnalysisError::FileError { .. }));
        assert!(err.is_load_failure());
    }

    #[test]
    fn test_missing_column_is_rejected_before_analysis() {
        let pipeline = Pipeline::builder().build().unwrap();
        let df = raw_frame().drop("Country").unwrap();
        let err = pipeline.process(df).unwrap_err();
        assert!(matches!(err, AnalysisError::FormatError(ref m) if m.contains("Country")));
        assert!(err.is_load_failure());
    }
}
