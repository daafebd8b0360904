//! Spreadsheet input (xlsx, xlsm, xlsb, xls, ods) read through calamine.
//!
//! The first worksheet is used and its first row is the header. Columns
//! whose cells are all numbers become numeric columns; anything else is kept
//! as text, with date cells written as `%Y-%m-%d %H:%M:%S` so the cleaner
//! parses them like CSV timestamps.

use crate::error::{AnalysisError, Result};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Read the first worksheet of the workbook in `content`.
pub(super) fn read_first_sheet(path: &Path, content: Vec<u8>) -> Result<DataFrame> {
    let malformed = |e: calamine::Error| {
        AnalysisError::FormatError(format!(
            "{}: unreadable spreadsheet: {}",
            path.display(),
            e
        ))
    };

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(content)).map_err(malformed)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            AnalysisError::FormatError(format!("{}: workbook has no worksheets", path.display()))
        })?
        .map_err(malformed)?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Err(AnalysisError::FormatError(format!(
            "{}: first worksheet is empty",
            path.display()
        )));
    };

    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| cell_text(cell).unwrap_or_else(|| format!("column_{}", i + 1)))
        .collect();

    let empty = Data::Empty;
    let mut cells: Vec<Vec<&Data>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (i, column) in cells.iter_mut().enumerate() {
            column.push(row.get(i).unwrap_or(&empty));
        }
    }

    let columns: Vec<Column> = names
        .iter()
        .zip(&cells)
        .map(|(name, values)| to_column(name, values))
        .collect();

    let df = DataFrame::new(columns)
        .map_err(|e| AnalysisError::FormatError(format!("{}: {}", path.display(), e)))?;
    debug!("Read worksheet from {}: {:?}", path.display(), df.shape());
    Ok(df)
}

/// Build a column from worksheet cells.
///
/// All-integer cells give `Int64`, all-numeric cells give `Float64`, any
/// other mix gives `String`. Blank and error cells are null.
fn to_column(name: &str, cells: &[&Data]) -> Column {
    let filled: Vec<&Data> = cells
        .iter()
        .copied()
        .filter(|c| cell_text(c).is_some())
        .collect();

    if filled.iter().all(|c| matches!(c, Data::Int(_))) {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|c| match c {
                Data::Int(v) => Some(*v),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), values);
    }

    if filled
        .iter()
        .all(|c| matches!(c, Data::Int(_) | Data::Float(_)))
    {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                Data::Int(v) => Some(*v as f64),
                Data::Float(v) => Some(*v),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), values);
    }

    let values: Vec<Option<String>> = cells.iter().map(|c| cell_text(c)).collect();
    Column::new(name.into(), values)
}

/// Text of a cell, `None` when blank.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Data::Int(v) => Some(v.to_string()),
        Data::Float(v) => Some(format_number(*v)),
        Data::Bool(v) => Some(v.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
        _ => None,
    }
}

/// Whole numbers print without a fractional part (stock codes, invoice ids).
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}
