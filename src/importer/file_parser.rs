// ==========================================
// Procurement Engine - catalog file parsers
// ==========================================
// Excel (.xlsx/.xls) and CSV (.csv); first row is the header.
// Header names are trimmed and lowercased. Fully blank rows are skipped.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// One data row keyed by header, with its 1-based line in the sheet
/// (the header is row 1).
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub row: usize,
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

pub trait FileParser: Send + Sync {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_start_matches('\u{feff}').trim().to_lowercase()
}

fn to_record(row: usize, headers: &[String], values: impl Iterator<Item = String>) -> Option<RawRecord> {
    let fields: HashMap<String, String> = headers
        .iter()
        .zip(values)
        .filter(|(h, _)| !h.is_empty())
        .map(|(h, v)| (h.clone(), v.trim().to_string()))
        .collect();

    if fields.values().all(|v| v.is_empty()) {
        return None;
    }
    Some(RawRecord { row, fields })
}

// ==========================================
// CSV
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        ensure_exists(file_path)?;
        let ext = extension(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            if let Some(r) = to_record(idx + 2, &headers, record.iter().map(str::to_string)) {
                records.push(r);
            }
        }

        Ok(records)
    }
}

// ==========================================
// Excel (first worksheet)
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        ensure_exists(file_path)?;
        let ext = extension(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("workbook has no worksheet".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .ok_or(ImportError::Empty)?
            .iter()
            .map(|cell| normalize_header(&cell.to_string()))
            .collect();

        let mut records = Vec::new();
        for (idx, data_row) in rows.enumerate() {
            if let Some(r) = to_record(idx + 2, &headers, data_row.iter().map(|c| c.to_string())) {
                records.push(r);
            }
        }

        Ok(records)
    }
}

// ==========================================
// Dispatch on extension
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRecord>> {
        let path = file_path.as_ref();
        match extension(path).as_str() {
            "csv" => CsvParser.parse_to_raw_records(path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_records(path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_csv_parser_rows_and_line_numbers() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, " Item_Key ,description,unit").unwrap();
        writeln!(file, "AB-001,Arroz Blanco,kg").unwrap();
        writeln!(file, ",,").unwrap();
        writeln!(file, "FR-003, Frijol Negro ,kg").unwrap();
        file.flush().unwrap();

        let records = CsvParser.parse_to_raw_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row, 2);
        assert_eq!(records[0].get("item_key"), Some("AB-001"));
        assert_eq!(records[1].row, 4);
        assert_eq!(records[1].get("description"), Some("Frijol Negro"));
    }

    #[test]
    fn test_missing_file() {
        let err = CsvParser
            .parse_to_raw_records(Path::new("/nonexistent/catalog.csv"))
            .unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        let err = UniversalFileParser.parse(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(ext) if ext == "txt"));
    }
}
