// ==========================================
// Procurement Engine - catalog import errors
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    // ===== File errors =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (only .xlsx/.xls/.csv)")]
    UnsupportedFormat(String),

    #[error("file read failed: {0}")]
    FileReadError(String),

    #[error("Excel parse failed: {0}")]
    ExcelParseError(String),

    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    // ===== Row errors =====
    #[error("missing column(s): {0}")]
    MissingColumns(String),

    #[error("row {row}: required field '{field}' is empty")]
    RequiredFieldMissing { row: usize, field: String },

    #[error("row {row}, field {field}: {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    #[error("row {row}: duplicate item key '{item_key}'")]
    DuplicateKey { row: usize, item_key: String },

    #[error("file has no data rows")]
    Empty,
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

pub type ImportResult<T> = Result<T, ImportError>;
