//! Error types for loading the input tables.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop the report before any view is produced.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input file does not exist.
    #[error("Input file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// File extension is not one of the supported tabular formats.
    #[error("Unsupported file format: '{extension}'. Supported formats: xlsx, xlsm, xls, ods, csv, parquet")]
    UnsupportedFormat { extension: String },

    /// Workbook has no sheet with the requested name.
    #[error("Sheet '{sheet}' not found in {}. Available sheets: {available:?}", path.display())]
    MissingSheet {
        path: PathBuf,
        sheet: String,
        available: Vec<String>,
    },

    /// Workbook has no sheets at all.
    #[error("Workbook has no sheets: {}", path.display())]
    EmptyWorkbook { path: PathBuf },

    /// A column the pipeline needs is absent from a table.
    #[error("Column '{column}' not found in {table} table. Available columns: {available:?}")]
    MissingColumn {
        table: &'static str,
        column: String,
        available: Vec<String>,
    },

    /// Boundary file is not a GeoJSON FeatureCollection.
    #[error("Invalid boundary file {}: {reason}", path.display())]
    InvalidBoundary { path: PathBuf, reason: String },
}
