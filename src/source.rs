//! Reading Excel workbooks into a [`Table`].
//!
//! Only spreadsheet formats are accepted. The chosen sheet's first row is the header row,
//! kept verbatim; each column's type is inferred from its cells.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, DataType as CalamineTrait, Reader, Sheets};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;
use tracing::info;

use crate::schema::ColumnNames;
use crate::table::Table;
use crate::SpreadsheetFormat;

/// Options for reading a workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// 0-based sheet index or sheet name. None = first sheet.
    pub sheet: Option<String>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColType {
    Int64,
    Float64,
    Boolean,
    Utf8,
}

/// Read a workbook file into a table. Rejects paths without a spreadsheet extension.
pub fn load_path(path: &Path, options: &LoadOptions, names: &ColumnNames) -> Result<Table> {
    if SpreadsheetFormat::from_path(path).is_none() {
        return Err(eyre!(
            "Unsupported file: {}. Expected an Excel workbook ({}).",
            path.display(),
            SpreadsheetFormat::EXTENSIONS
                .iter()
                .map(|e| format!(".{}", e))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    let bytes = std::fs::read(path)?;
    let table = load_bytes(bytes, options, names)?;
    info!(
        path = %path.display(),
        rows = table.height(),
        columns = table.headers().len(),
        "loaded workbook"
    );
    Ok(table)
}

/// Parse an in-memory workbook payload into a table.
pub fn load_bytes(bytes: Vec<u8>, options: &LoadOptions, names: &ColumnNames) -> Result<Table> {
    let workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| eyre!("Excel: {}", e))?;
    let df = read_sheet(workbook, options.sheet.as_deref())?;
    Ok(Table::from_dataframe(df, names.clone())?)
}

fn read_sheet<RS: Read + Seek>(mut workbook: Sheets<RS>, sheet: Option<&str>) -> Result<DataFrame> {
    if workbook.sheet_names().is_empty() {
        return Err(eyre!("Excel file has no worksheets"));
    }
    let range = match sheet {
        Some(sel) => match sel.parse::<usize>() {
            Ok(idx) => workbook
                .worksheet_range_at(idx)
                .ok_or_else(|| eyre!("Excel: no sheet at index {}", idx))?
                .map_err(|e| eyre!("Excel: {}", e))?,
            Err(_) => workbook
                .worksheet_range(sel)
                .map_err(|e| eyre!("Excel: {}", e))?,
        },
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| eyre!("Excel: no first sheet"))?
            .map_err(|e| eyre!("Excel: {}", e))?,
    };
    let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
    frame_from_rows(&rows)
}

/// Build a frame from sheet rows; the first row holds the headers.
pub fn frame_from_rows(rows: &[Vec<Data>]) -> Result<DataFrame> {
    let Some((header_row, body)) = rows.split_first() else {
        return Err(eyre!("Sheet is empty: no header row"));
    };
    let mut columns = Vec::with_capacity(header_row.len());
    let mut names: Vec<String> = Vec::with_capacity(header_row.len());
    for (col_idx, header) in header_row.iter().enumerate() {
        let name = match CalamineTrait::as_string(header) {
            Some(h) if !h.is_empty() => h,
            _ => format!("column_{}", col_idx + 1),
        };
        let name = unique_header(name, &names);
        names.push(name.clone());
        let cells: Vec<Option<&Data>> = body.iter().map(|row| row.get(col_idx)).collect();
        let series = column_to_series(&name, &cells, infer_column_type(&cells));
        columns.push(series.into());
    }
    Ok(DataFrame::new(columns)?)
}

/// Repeated headers get `.1`, `.2`, ... appended, skipping names already taken.
fn unique_header(name: String, taken: &[String]) -> String {
    if !taken.contains(&name) {
        return name;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{}.{}", name, n);
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Any string forces text; integers (or whole-number floats) give Int64.
fn infer_column_type(cells: &[Option<&Data>]) -> ColType {
    let mut has_float = false;
    let mut has_int = false;
    let mut has_bool = false;
    for cell in cells.iter().flatten() {
        if CalamineTrait::is_empty(*cell) {
            continue;
        }
        if CalamineTrait::is_string(*cell)
            || CalamineTrait::is_datetime(*cell)
            || CalamineTrait::is_datetime_iso(*cell)
            || matches!(cell, Data::DurationIso(_) | Data::Error(_))
        {
            return ColType::Utf8;
        }
        if CalamineTrait::is_float(*cell) {
            has_float = true;
        }
        if CalamineTrait::is_int(*cell) {
            has_int = true;
        }
        if CalamineTrait::is_bool(*cell) {
            has_bool = true;
        }
    }
    if has_bool && (has_int || has_float) {
        ColType::Utf8
    } else if has_float {
        let all_whole = cells.iter().flatten().all(|cell| {
            cell.as_f64()
                .is_none_or(|f| f.is_finite() && (f - f.trunc()).abs() < 1e-10)
        });
        if all_whole {
            ColType::Int64
        } else {
            ColType::Float64
        }
    } else if has_int {
        ColType::Int64
    } else if has_bool {
        ColType::Boolean
    } else {
        ColType::Utf8
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn column_to_series(name: &str, cells: &[Option<&Data>], col_type: ColType) -> Series {
    match col_type {
        ColType::Int64 => {
            let v: Vec<Option<i64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.as_i64()))
                .collect();
            Series::new(name.into(), v)
        }
        ColType::Float64 => {
            let v: Vec<Option<f64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.as_f64()))
                .collect();
            Series::new(name.into(), v)
        }
        ColType::Boolean => {
            let v: Vec<Option<bool>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.get_bool()))
                .collect();
            Series::new(name.into(), v)
        }
        ColType::Utf8 => {
            let v: Vec<Option<String>> = cells.iter().map(|c| c.and_then(cell_text)).collect();
            Series::new(name.into(), v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    #[test]
    fn test_headers_kept_verbatim_and_types_inferred() {
        let rows = vec![
            vec![s("Farmer ID"), s("Name of the  Farmer"), s("Total Area Holding (Ha)"), Data::Empty],
            vec![Data::Float(101.0), s("Ravi"), Data::Float(1.25), Data::Bool(true)],
            vec![Data::Int(102), s("Lakshmi"), Data::Float(2.0), Data::Empty],
        ];
        let df = frame_from_rows(&rows).unwrap();
        assert_eq!(
            df.get_column_names()
                .into_iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>(),
            vec!["Farmer ID", "Name of the  Farmer", "Total Area Holding (Ha)", "column_4"]
        );
        assert_eq!(df.column("Farmer ID").unwrap().dtype(), &DataType::Int64);
        assert_eq!(
            df.column("Total Area Holding (Ha)").unwrap().dtype(),
            &DataType::Float64
        );
        assert_eq!(df.column("column_4").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_mixed_text_and_numbers_become_text() {
        let rows = vec![
            vec![s("Total Area Holding (Ha)")],
            vec![Data::Float(1.5)],
            vec![s("two")],
        ];
        let df = frame_from_rows(&rows).unwrap();
        let col = df.column("Total Area Holding (Ha)").unwrap();
        assert_eq!(col.dtype(), &DataType::String);
        assert_eq!(col.str().unwrap().get(0), Some("1.5"));
        assert_eq!(col.str().unwrap().get(1), Some("two"));
    }

    #[test]
    fn test_short_rows_padded_with_nulls() {
        let rows = vec![vec![s("Village"), s("Gender M/F")], vec![s("A")]];
        let df = frame_from_rows(&rows).unwrap();
        assert_eq!(df.column("Gender M/F").unwrap().null_count(), 1);
    }

    #[test]
    fn test_duplicate_headers_are_suffixed() {
        let rows = vec![
            vec![s("Village"), s("Village"), s("Village.1"), s("Village")],
            vec![s("A"), s("B"), s("C"), s("D")],
        ];
        let df = frame_from_rows(&rows).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["Village", "Village.1", "Village.1.1", "Village.2"]);
        assert_eq!(df.column("Village").unwrap().str().unwrap().get(0), Some("A"));
        assert_eq!(df.column("Village.2").unwrap().str().unwrap().get(0), Some("D"));
    }

    #[test]
    fn test_empty_sheet_is_an_error() {
        assert!(frame_from_rows(&[]).is_err());
    }

    #[test]
    fn test_non_spreadsheet_path_rejected() {
        let err = load_path(
            Path::new("farmers.csv"),
            &LoadOptions::default(),
            &ColumnNames::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unsupported file"));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = load_bytes(
            b"not a workbook".to_vec(),
            &LoadOptions::default(),
            &ColumnNames::default(),
        );
        assert!(err.is_err());
    }
}
