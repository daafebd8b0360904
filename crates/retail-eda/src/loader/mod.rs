//! Loading of the transaction log.
//!
//! The loader reads the exported log into a polars [`DataFrame`], keeping
//! column names and row order, and checks that the columns the analysis
//! depends on are present and usable. Spreadsheets (xlsx, xls, ods) are read
//! from their first worksheet; anything else is parsed as CSV. It is the only
//! stage with fatal failure modes.

mod excel;

use crate::columns;
use crate::error::{AnalysisError, Result, ResultExt};
use crate::utils::is_numeric_dtype;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// Physical format of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Spreadsheet,
}

impl InputFormat {
    /// Decide from the file extension, then from the leading bytes.
    pub fn detect(path: &Path, content: &[u8]) -> Self {
        let by_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| {
                SPREADSHEET_EXTENSIONS
                    .iter()
                    .any(|s| e.eq_ignore_ascii_case(s))
            });

        if by_extension || content.starts_with(ZIP_MAGIC) || content.starts_with(OLE_MAGIC) {
            InputFormat::Spreadsheet
        } else {
            InputFormat::Csv
        }
    }
}

/// Loader for retail transaction logs.
pub struct DataLoader;

impl DataLoader {
    /// Load and validate the transaction log at `path`.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::FileError`] if the file is missing or unreadable.
    /// - [`AnalysisError::FormatError`] if the content cannot be parsed, a
    ///   required column is absent, or a numeric column holds non-numeric
    ///   values.
    pub fn load(path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        info!("Loading dataset from: {}", path.display());

        let content = std::fs::read(path).map_err(|e| AnalysisError::file(path, e))?;
        let df = Self::read(path, content)?;
        let df = Self::validate(df)?;

        info!("Dataset loaded successfully: {:?}", df.shape());
        Ok(df)
    }

    /// Parse CSV or spreadsheet bytes that are already in memory.
    pub fn load_from_bytes(content: Vec<u8>) -> Result<DataFrame> {
        let df = Self::read(Path::new("<memory>"), content)?;
        Self::validate(df)
    }

    /// Check required columns and coerce numeric columns to numbers.
    ///
    /// String-typed numeric columns are accepted when every non-null value
    /// parses as a number.
    pub fn validate(df: DataFrame) -> Result<DataFrame> {
        if df.width() == 0 {
            return Err(AnalysisError::FormatError(
                "dataset has no columns".to_string(),
            ));
        }

        for name in columns::REQUIRED {
            if df.column(name).is_err() {
                return Err(AnalysisError::FormatError(format!(
                    "required column '{}' missing",
                    name
                )));
            }
        }

        let mut df = df;
        for name in columns::NUMERIC {
            let series = df.column(name)?.as_materialized_series().clone();
            if is_numeric_dtype(series.dtype()) {
                continue;
            }
            if !matches!(series.dtype(), DataType::String) {
                return Err(AnalysisError::FormatError(format!(
                    "column '{}' has unsupported type {}",
                    name,
                    series.dtype()
                )));
            }

            let mut unparseable = 0usize;
            let values: Vec<Option<f64>> = series
                .str()?
                .into_iter()
                .map(|v| match v.map(str::trim) {
                    None | Some("") => None,
                    Some(s) => s.parse::<f64>().map_err(|_| unparseable += 1).ok(),
                })
                .collect();
            if unparseable > 0 {
                return Err(AnalysisError::FormatError(format!(
                    "column '{}' contains {} non-numeric values",
                    name, unparseable
                )));
            }
            debug!("Cast string column {} to Float64", name);
            df.replace(name, Series::new(name.into(), values))
                .context(format!("Coercing column '{name}'"))?;
        }

        Ok(df)
    }

    /// Text preview of the first `n` rows.
    pub fn preview(df: &DataFrame, n: usize) -> String {
        format!("{}", df.head(Some(n)))
    }

    fn read(path: &Path, content: Vec<u8>) -> Result<DataFrame> {
        match InputFormat::detect(path, &content) {
            InputFormat::Spreadsheet => excel::read_first_sheet(path, content),
            InputFormat::Csv => Self::read_with_fallbacks(path, content),
        }
    }

    fn read_with_fallbacks(path: &Path, content: Vec<u8>) -> Result<DataFrame> {
        // Strategy 1: standard loading with quote handling
        match CsvReadOptions::default()
            .with_infer_schema_length(None)
            .with_has_header(true)
            .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
            .into_reader_with_file_handle(Cursor::new(content.clone()))
            .finish()
        {
            Ok(df) => return Ok(df),
            Err(e) => debug!("Standard loading of {} failed: {}", path.display(), e),
        }

        // Strategy 2: without quote handling
        match CsvReadOptions::default()
            .with_infer_schema_length(None)
            .with_has_header(true)
            .with_parse_options(CsvParseOptions::default().with_quote_char(None))
            .into_reader_with_file_handle(Cursor::new(content.clone()))
            .finish()
        {
            Ok(df) => return Ok(df),
            Err(e) => debug!("Loading {} without quotes failed: {}", path.display(), e),
        }

        // Strategy 3: pre-clean content
        let text = String::from_utf8_lossy(&content);
        let cleaned = clean_csv_content(&text);
        CsvReadOptions::default()
            .with_infer_schema_length(None)
            .with_has_header(true)
            .into_reader_with_file_handle(Cursor::new(cleaned.into_bytes()))
            .finish()
            .map_err(|e| {
                AnalysisError::FormatError(format!("{}: {}", path.display(), e))
            })
    }
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
