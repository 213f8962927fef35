// ==========================================
// Procurement Engine - import layer
// ==========================================
// Responsibility: turn supplier catalog files into contract item inputs
// Supported: Excel, CSV
// ==========================================

pub mod catalog_importer;
pub mod error;
pub mod file_parser;

pub use catalog_importer::CatalogImporter;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
