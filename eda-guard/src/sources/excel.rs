//! Spreadsheet workbooks (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`).

use super::text;
use crate::core::Dataset;
use crate::prelude::*;
use arrow::array::{ArrayRef, StringArray};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// File extensions read as spreadsheet workbooks.
pub const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// True when `path` has one of [`WORKBOOK_EXTENSIONS`].
pub fn is_workbook(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        WORKBOOK_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// Reads one sheet as a text-only [`Dataset`].
///
/// The sheet name is matched ignoring case and surrounding spaces. The first
/// row is the header; empty cells become nulls and whole numbers are written
/// without a decimal part.
pub fn read_sheet(path: &Path, sheet: &str) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        EdaError::data_source_with_source(
            "excel",
            format!("failed to open {}", path.display()),
            Box::new(e),
        )
    })?;

    let wanted = sheet.trim();
    let name = workbook
        .sheet_names()
        .into_iter()
        .find(|name| name.trim().eq_ignore_ascii_case(wanted))
        .ok_or_else(|| EdaError::SheetNotFound {
            sheet: sheet.to_string(),
            path: path.display().to_string(),
        })?;

    let range = workbook.worksheet_range(&name).map_err(|e| {
        EdaError::data_source_with_source(
            "excel",
            format!("failed to read sheet '{name}' of {}", path.display()),
            Box::new(e),
        )
    })?;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| {
        EdaError::Configuration(format!(
            "sheet '{name}' in {} is empty",
            path.display()
        ))
    })?;
    let names = text::unique_column_names(
        header
            .iter()
            .map(|cell| cell_text(cell).unwrap_or_default())
            .collect(),
    );

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (idx, column) in columns.iter_mut().enumerate() {
            column.push(row.get(idx).and_then(cell_text));
        }
    }
    debug!(
        sheet = %name,
        columns = names.len(),
        rows = columns.first().map_or(0, Vec::len),
        "Read workbook sheet"
    );

    Dataset::from_columns(
        names
            .into_iter()
            .zip(columns)
            .map(|(name, values)| (name, Arc::new(StringArray::from(values)) as ArrayRef)),
    )
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        other => Some(other.to_string()),
    }
}
