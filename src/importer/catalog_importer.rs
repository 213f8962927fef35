// ==========================================
// Procurement Engine - contract item catalog importer
// ==========================================
// Columns: item_key, description, unit, unit_price, max_quantity,
//          classification (optional)
// The first bad row aborts the import; errors carry the sheet row.
// ==========================================

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::domain::ContractItemInput;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawRecord, UniversalFileParser};

pub const REQUIRED_COLUMNS: [&str; 5] = [
    "item_key",
    "description",
    "unit",
    "unit_price",
    "max_quantity",
];

#[derive(Debug, Default)]
pub struct CatalogImporter;

impl CatalogImporter {
    pub fn new() -> Self {
        Self
    }

    /// Parse a CSV/Excel catalog into contract item inputs.
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> ImportResult<Vec<ContractItemInput>> {
        let path = path.as_ref();
        let records = UniversalFileParser.parse(path)?;
        let items = self.map_records(&records)?;
        info!(file = %path.display(), items = items.len(), "catalog imported");
        Ok(items)
    }

    pub fn map_records(&self, records: &[RawRecord]) -> ImportResult<Vec<ContractItemInput>> {
        let first = records.first().ok_or(ImportError::Empty)?;
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !first.fields.contains_key(*c))
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing.join(", ")));
        }

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(records.len());
        for record in records {
            let item = map_record(record)?;
            if !seen.insert(item.item_key.clone()) {
                return Err(ImportError::DuplicateKey {
                    row: record.row,
                    item_key: item.item_key,
                });
            }
            items.push(item);
        }
        Ok(items)
    }
}

fn required(record: &RawRecord, field: &str) -> ImportResult<String> {
    match record.get(field) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ImportError::RequiredFieldMissing {
            row: record.row,
            field: field.to_string(),
        }),
    }
}

fn conversion(record: &RawRecord, field: &str, message: String) -> ImportError {
    ImportError::TypeConversionError {
        row: record.row,
        field: field.to_string(),
        message,
    }
}

fn map_record(record: &RawRecord) -> ImportResult<ContractItemInput> {
    let item_key = required(record, "item_key")?;
    let description = required(record, "description")?;
    let unit = required(record, "unit")?;

    let raw_price = required(record, "unit_price")?;
    let unit_price = raw_price
        .replace(',', "")
        .trim_start_matches('$')
        .parse::<f64>()
        .map_err(|e| conversion(record, "unit_price", format!("'{}': {}", raw_price, e)))?;
    if !unit_price.is_finite() || unit_price < 0.0 {
        return Err(conversion(
            record,
            "unit_price",
            format!("must be >= 0, got {}", raw_price),
        ));
    }

    let raw_max = required(record, "max_quantity")?;
    let max_quantity = parse_whole(&raw_max)
        .ok_or_else(|| conversion(record, "max_quantity", format!("'{}' is not a whole number", raw_max)))?;
    if max_quantity < 0 {
        return Err(conversion(
            record,
            "max_quantity",
            format!("must be >= 0, got {}", max_quantity),
        ));
    }

    let classification = record
        .get("classification")
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    Ok(ContractItemInput {
        item_key,
        description,
        unit,
        unit_price,
        max_quantity,
        classification,
    })
}

/// "5000", "5,000" and Excel's "5000.0" are all 5000.
fn parse_whole(raw: &str) -> Option<i64> {
    let cleaned = raw.replace(',', "");
    if let Ok(v) = cleaned.parse::<i64>() {
        return Some(v);
    }
    let f = cleaned.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(row: usize, pairs: &[(&str, &str)]) -> RawRecord {
        RawRecord {
            row,
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn full(row: usize, key: &str, price: &str, max: &str) -> RawRecord {
        record(
            row,
            &[
                ("item_key", key),
                ("description", "Arroz Blanco Super Extra"),
                ("unit", "kg"),
                ("unit_price", price),
                ("max_quantity", max),
                ("classification", "GRANOS"),
            ],
        )
    }

    #[test]
    fn test_maps_valid_rows() {
        let items = CatalogImporter::new()
            .map_records(&[full(2, "AB-001", "22.50", "5000"), full(3, "FR-003", "$35", "8,000.0")])
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].unit_price, 22.5);
        assert_eq!(items[1].max_quantity, 8000);
        assert_eq!(items[1].classification.as_deref(), Some("GRANOS"));
    }

    #[test]
    fn test_reports_row_number() {
        let err = CatalogImporter::new()
            .map_records(&[full(2, "AB-001", "22.50", "5000"), full(3, "FR-003", "abc", "10")])
            .unwrap_err();
        assert!(matches!(err, ImportError::TypeConversionError { row: 3, ref field, .. } if field == "unit_price"));

        let err = CatalogImporter::new()
            .map_records(&[full(7, "AB-001", "1", "12.5")])
            .unwrap_err();
        assert!(matches!(err, ImportError::TypeConversionError { row: 7, .. }));
    }

    #[test]
    fn test_rejects_negative_and_duplicates() {
        let importer = CatalogImporter::new();
        assert!(importer.map_records(&[full(2, "A", "-1", "5")]).is_err());
        assert!(importer.map_records(&[full(2, "A", "1", "-5")]).is_err());

        let err = importer
            .map_records(&[full(2, "A", "1", "5"), full(3, "A", "1", "5")])
            .unwrap_err();
        assert!(matches!(err, ImportError::DuplicateKey { row: 3, .. }));
    }

    #[test]
    fn test_missing_columns_and_empty_key() {
        let err = CatalogImporter::new()
            .map_records(&[record(2, &[("item_key", "A")])])
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingColumns(_)));

        let err = CatalogImporter::new()
            .map_records(&[full(2, "", "1", "5")])
            .unwrap_err();
        assert!(matches!(err, ImportError::RequiredFieldMissing { row: 2, .. }));

        assert!(matches!(
            CatalogImporter::new().map_records(&[]),
            Err(ImportError::Empty)
        ));
    }
}
