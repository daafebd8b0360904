//! Pipeline module.
//!
//! This module provides the analysis pipeline, outlier detection and
//! progress reporting.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use outliers::{IQR_MULTIPLIER, OutlierDetector};
pub use progress::{AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
