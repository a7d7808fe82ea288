//! Tabular loader for spreadsheet, CSV and Parquet files

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;

use super::error::LoadError;
use super::normalize::format_numeric_code;

/// Load a table from a file, choosing the reader by extension.
///
/// Workbooks (`xlsx`, `xlsm`, `xlsb`, `xls`, `ods`) are read with calamine; `sheet`
/// selects a worksheet by name and defaults to the first one. CSV and Parquet
/// go through polars and ignore `sheet`.
///
/// CSV columns are all read as text. The column helpers parse each value, so
/// a malformed cell anywhere in the file becomes `None` rather than an error.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<DataFrame> {
    if !path.exists() {
        return Err(LoadError::MissingFile {
            path: path.to_path_buf(),
        }
        .into());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let df = match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path, sheet)?,
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(0))
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?
            .collect()
            .with_context(|| format!("Failed to read CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?
            .collect()
            .with_context(|| format!("Failed to read Parquet file: {}", path.display()))?,
        _ => return Err(LoadError::UnsupportedFormat { extension }.into()),
    };

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "table loaded"
    );

    Ok(df)
}

/// One worksheet cell after type coercion
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Empty,
}

impl Cell {
    fn from_data(data: Option<&Data>) -> Self {
        match data {
            None | Some(Data::Empty) | Some(Data::Error(_)) => Cell::Empty,
            Some(Data::Int(v)) => Cell::Int(*v),
            Some(Data::Float(v)) => Cell::Float(*v),
            Some(Data::String(s)) if s.trim().is_empty() => Cell::Empty,
            Some(Data::String(s)) => Cell::Text(s.clone()),
            Some(Data::Bool(b)) => Cell::Text(b.to_string()),
            Some(Data::DateTime(dt)) => Cell::Float(dt.as_f64()),
            Some(other) => Cell::Text(other.to_string()),
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Cell::Int(v) => Some(v.to_string()),
            Cell::Float(v) => Some(format_numeric_code(*v)),
            Cell::Text(s) => Some(s.clone()),
            Cell::Empty => None,
        }
    }
}

fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(name) => {
            if !sheet_names.iter().any(|s| s == name) {
                return Err(LoadError::MissingSheet {
                    path: path.to_path_buf(),
                    sheet: name.to_string(),
                    available: sheet_names,
                }
                .into());
            }
            name.to_string()
        }
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| LoadError::EmptyWorkbook {
                path: path.to_path_buf(),
            })?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet '{}' from {}", sheet_name, path.display()))?;

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(row) => row
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                Cell::from_data(Some(cell))
                    .as_text()
                    .map(|s| s.trim().to_string())
                    .unwrap_or_else(|| format!("column_{}", idx + 1))
            })
            .collect(),
        None => return Ok(DataFrame::empty()),
    };

    let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); header.len()];
    for row in rows {
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(Cell::from_data(row.get(idx)));
        }
    }

    let columns: Vec<Column> = header
        .iter()
        .zip(cells)
        .map(|(name, values)| build_column(name, values))
        .collect();

    DataFrame::new(columns)
        .with_context(|| format!("Failed to build table from sheet '{}'", sheet_name))
}

/// Build a typed column: Int64 when every value is integral, Float64 when every
/// value is numeric, String otherwise.
fn build_column(name: &str, values: Vec<Cell>) -> Column {
    let all_integral = values.iter().all(|c| match c {
        Cell::Int(_) | Cell::Empty => true,
        Cell::Float(v) => v.fract() == 0.0 && v.abs() < 1e15,
        Cell::Text(_) => false,
    });

    if all_integral {
        let ints: Vec<Option<i64>> = values
            .iter()
            .map(|c| match c {
                Cell::Int(v) => Some(*v),
                Cell::Float(v) => Some(*v as i64),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), ints);
    }

    let all_numeric = values
        .iter()
        .all(|c| matches!(c, Cell::Int(_) | Cell::Float(_) | Cell::Empty));

    if all_numeric {
        let floats: Vec<Option<f64>> = values
            .iter()
            .map(|c| match c {
                Cell::Int(v) => Some(*v as f64),
                Cell::Float(v) => Some(*v),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), floats);
    }

    let strings: Vec<Option<String>> = values.iter().map(Cell::as_text).collect();
    Column::new(name.into(), strings)
}

/// Look up a required column, reporting the available ones on failure
pub fn require_column<'a>(
    df: &'a DataFrame,
    table: &'static str,
    name: &str,
) -> Result<&'a Column, LoadError> {
    df.column(name).map_err(|_| LoadError::MissingColumn {
        table,
        column: name.to_string(),
        available: df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect(),
    })
}

/// Read a column as strings. Float values print without a trailing `.0`
/// when they are integral.
pub fn string_values(column: &Column) -> Result<Vec<Option<String>>> {
    if column.dtype().is_float() {
        let float_col = column.cast(&DataType::Float64)?;
        let values = float_col
            .f64()?
            .iter()
            .map(|v| v.filter(|x| !x.is_nan()).map(format_numeric_code))
            .collect();
        return Ok(values);
    }

    let string_col = column.cast(&DataType::String)?;
    let values = string_col
        .str()?
        .iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Read a column as floats. Values that do not parse become `None`.
pub fn float_values(column: &Column) -> Result<Vec<Option<f64>>> {
    if matches!(column.dtype(), DataType::String) {
        let values = column
            .str()?
            .iter()
            .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        return Ok(values);
    }

    let float_col = column.cast(&DataType::Float64)?;
    let values = float_col
        .f64()?
        .iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect();
    Ok(values)
}

/// Read a column as integers. Non-integral or unparseable values become `None`.
pub fn integer_values(column: &Column) -> Result<Vec<Option<i64>>> {
    Ok(float_values(column)?
        .into_iter()
        .map(|v| v.filter(|x| x.fract() == 0.0).map(|x| x as i64))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_column_integral_floats_become_int() {
        let column = build_column(
            "code",
            vec![Cell::Float(5001.0), Cell::Int(11001), Cell::Empty],
        );
        assert_eq!(column.dtype(), &DataType::Int64);
        assert_eq!(column.null_count(), 1);
    }

    #[test]
    fn test_build_column_mixed_becomes_string() {
        let column = build_column(
            "cause",
            vec![Cell::Text("X95".to_string()), Cell::Int(7), Cell::Float(2.5)],
        );
        let values = string_values(&column).unwrap();
        assert_eq!(
            values,
            vec![
                Some("X95".to_string()),
                Some("7".to_string()),
                Some("2.5".to_string())
            ]
        );
    }

    #[test]
    fn test_build_column_fractional_floats_stay_float() {
        let column = build_column("age", vec![Cell::Float(1.5), Cell::Int(3)]);
        assert_eq!(column.dtype(), &DataType::Float64);
    }

    #[test]
    fn test_float_values_from_strings() {
        let column = Column::new("age".into(), vec![Some("12"), Some("abc"), None]);
        let values = float_values(&column).unwrap();
        assert_eq!(values, vec![Some(12.0), None, None]);
    }

    #[test]
    fn test_integer_values_drop_fractions() {
        let column = Column::new("month".into(), vec![Some(3.0f64), Some(3.5), None]);
        assert_eq!(integer_values(&column).unwrap(), vec![Some(3), None, None]);
    }

    #[test]
    fn test_integer_values_from_text() {
        let column = Column::new("MES".into(), vec![Some(" 12 "), Some("13"), Some("x"), None]);
        assert_eq!(
            integer_values(&column).unwrap(),
            vec![Some(12), Some(13), None, None]
        );
    }

    #[test]
    fn test_string_values_format_integral_floats() {
        let column = Column::new("code".into(), vec![Some(5001.0f64), None]);
        assert_eq!(
            string_values(&column).unwrap(),
            vec![Some("5001".to_string()), None]
        );
    }
}
