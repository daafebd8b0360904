//! Retail Transaction Analysis Library
//!
//! Exploratory data analysis of a retail transaction log, built on Polars.
//!
//! # Overview
//!
//! The analysis is a one-way pipeline over an in-memory table:
//!
//! - **Loading**: spreadsheet (xlsx, xls, ods) or CSV input with
//!   required-column and numeric-type checks
//! - **Cleaning**: drops rows without a customer, with non-positive quantity
//!   or price, with unparseable dates, and exact duplicates; derives
//!   `TotalSales`, `Month` and `DayOfWeek`
//! - **Summary**: descriptive statistics and sales/quantity rankings by
//!   country, product, month and weekday
//! - **Charts**: eight charts, rendered to SVG by default
//! - **Outliers**: IQR fences on quantity and unit price
//! - **Reporting**: fixed text report and a serializable JSON report
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use retail_eda::{AnalysisConfig, Pipeline, TextReporter};
//!
//! let config = AnalysisConfig::builder()
//!     .input_path("Online Retail.xlsx")
//!     .output_dir("outputs")
//!     .top_n(10)
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! TextReporter::default().write_report(&mut std::io::stdout(), &result)?;
//! ```
//!
//! # Custom chart output
//!
//! Charts are described by [`ChartSpec`] values and drawn by a
//! [`ChartRenderer`]. Supply your own renderer to target another format:
//!
//! ```rust,ignore
//! let pipeline = Pipeline::builder()
//!     .renderer(Arc::new(MyPngRenderer::default()))
//!     .build()?;
//! ```

pub mod cleaner;
pub mod columns;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod reporting;
pub mod summary;
pub mod types;
pub mod utils;
pub mod visualizer;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError, DisplayConfig};
pub use error::{AnalysisError, Result as EdaResult, ResultExt};
pub use loader::{DataLoader, InputFormat};
pub use pipeline::{
    AnalysisStage, ClosureProgressReporter, OutlierDetector, Pipeline, PipelineBuilder,
    ProgressReporter, ProgressUpdate,
};
pub use reporting::{AnalysisReport, ReportGenerator, TextReporter};
pub use summary::Summarizer;
pub use types::{
    AnalysisResult, CleaningReport, ColumnDescription, IqrFence, MissingValueCount, MonthlyTotal,
    OutlierReport, RankedTotal, SalesSummary, WeekdayTotal,
};
pub use visualizer::{ChartKind, ChartRenderer, ChartSpec, SvgChartRenderer, Visualizer};
