//! Custom error types for the retail analysis pipeline.
//!
//! Only load-time failures are fatal: a missing or unreadable input file is a
//! [`AnalysisError::FileError`], data that cannot be parsed into the expected
//! table (including a missing required column) is a
//! [`AnalysisError::FormatError`]. Per-row problems never surface
//! here; the cleaner turns them into counts.
//!
//! Errors are serializable as `{code, message}` so the JSON report path can
//! emit them alongside regular output.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Input file is missing or unreadable.
    #[error("Cannot read input file '{}': {source}", path.display())]
    FileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input could not be parsed into rows/columns of the expected shape.
    #[error("Malformed input: {0}")]
    FormatError(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data cleaning failed.
    #[error("Failed to clean data: {0}")]
    CleaningFailed(String),

    /// Summary statistics or aggregation failed.
    #[error("Failed to summarize data: {0}")]
    SummaryFailed(String),

    /// Outlier detection failed.
    #[error("Failed to detect outliers: {0}")]
    OutlierDetectionFailed(String),

    /// Chart rendering failed.
    #[error("Failed to render chart '{chart}': {reason}")]
    ChartRenderingFailed { chart: String, reason: String },

    /// Report generation failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a [`AnalysisError::FileError`] for `path`.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::FileError {
            path: path.into(),
            source,
        }
    }

    /// Stable error code, used in serialized output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FileError { .. } => "FILE_ERROR",
            Self::FormatError(_) => "FORMAT_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::CleaningFailed(_) => "CLEANING_FAILED",
            Self::SummaryFailed(_) => "SUMMARY_FAILED",
            Self::OutlierDetectionFailed(_) => "OUTLIER_DETECTION_FAILED",
            Self::ChartRenderingFailed { .. } => "CHART_RENDERING_FAILED",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether this error happened while loading the input, before any
    /// statistics were computed.
    pub fn is_load_failure(&self) -> bool {
        match self {
            Self::FileError { .. } | Self::FormatError(_) => true,
            Self::WithContext { source, .. } => source.is_load_failure(),
            _ => false,
        }
    }
}

impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}
