// ==========================================
// Procurement Engine - table mapping and equality criteria
// ==========================================
// A TableMapping describes one entity table: name, ordered column list,
// row -> entity and entity -> values. SqlRepository builds all SQL from it.
// Column names never come from callers unchecked.
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{Type, Value};
use rusqlite::Row;

use crate::repository::error::{RepositoryError, RepositoryResult};

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// TableMapping
// ==========================================
pub trait TableMapping: Sized {
    /// Entity name used in error messages
    const ENTITY: &'static str;
    /// Table name
    const TABLE: &'static str;
    /// Columns excluding `id`, in `to_values` / `from_row` order
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    /// Values for `COLUMNS`, same order.
    fn to_values(&self) -> RepositoryResult<Vec<Value>>;

    /// Row layout: `id` at index 0, then `COLUMNS` from index 1.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn has_column(column: &str) -> bool {
        column == "id" || Self::COLUMNS.contains(&column)
    }
}

// ==========================================
// Criteria - AND of column equalities
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    clauses: Vec<(&'static str, Value)>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = value`; a NULL value becomes `column IS NULL`.
    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.clauses.push((column, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render the WHERE clause (without the keyword) and its bound values.
    pub(crate) fn to_sql<E: TableMapping>(&self) -> RepositoryResult<(String, Vec<&Value>)> {
        let mut parts = Vec::with_capacity(self.clauses.len());
        let mut values = Vec::with_capacity(self.clauses.len());

        for (column, value) in &self.clauses {
            if !E::has_column(column) {
                return Err(RepositoryError::ValidationError(format!(
                    "unknown column '{}' for {}",
                    column,
                    E::ENTITY
                )));
            }
            if matches!(value, Value::Null) {
                parts.push(format!("{} IS NULL", column));
            } else {
                values.push(value);
                parts.push(format!("{} = ?{}", column, values.len()));
            }
        }

        if parts.is_empty() {
            return Ok(("1 = 1".to_string(), values));
        }
        Ok((parts.join(" AND "), values))
    }
}

// ==========================================
// Value helpers
// ==========================================

pub fn date_value(date: NaiveDate) -> Value {
    Value::Text(date.format(DATE_FMT).to_string())
}

pub fn datetime_value(ts: NaiveDateTime) -> Value {
    Value::Text(ts.format(DATETIME_FMT).to_string())
}

pub fn opt_text(value: &Option<String>) -> Value {
    match value {
        Some(s) => Value::Text(s.clone()),
        None => Value::Null,
    }
}

pub fn opt_int(value: Option<i64>) -> Value {
    match value {
        Some(v) => Value::Integer(v),
        None => Value::Null,
    }
}

// ==========================================
// Row helpers
// ==========================================

fn conversion_error(idx: usize, field: &str, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        Box::new(RepositoryError::FieldValueError {
            field: field.to_string(),
            message,
        }),
    )
}

pub fn get_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FMT)
        .map_err(|e| conversion_error(idx, "date", format!("'{}': {}", raw, e)))
}

pub fn get_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, DATETIME_FMT)
        .map_err(|e| conversion_error(idx, "datetime", format!("'{}': {}", raw, e)))
}

/// Parse a TEXT column through an enum-style `from_str`.
pub fn get_parsed<T>(
    row: &Row<'_>,
    idx: usize,
    field: &str,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| conversion_error(idx, field, format!("unknown value '{}'", raw)))
}

/// Parse a TEXT column holding JSON.
pub fn get_json<T: serde::de::DeserializeOwned>(
    row: &Row<'_>,
    idx: usize,
    field: &str,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, field, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample {
        id: i64,
        name: String,
    }

    impl TableMapping for Sample {
        const ENTITY: &'static str = "Sample";
        const TABLE: &'static str = "sample";
        const COLUMNS: &'static [&'static str] = &["name", "state"];

        fn id(&self) -> i64 {
            self.id
        }
        fn set_id(&mut self, id: i64) {
            self.id = id;
        }
        fn to_values(&self) -> RepositoryResult<Vec<Value>> {
            Ok(vec![Value::Text(self.name.clone()), Value::Null])
        }
        fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
            Ok(Sample {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        }
    }

    #[test]
    fn test_criteria_renders_placeholders_in_order() {
        let criteria = Criteria::new()
            .eq("name", "x".to_string())
            .eq("state", Value::Null)
            .eq("id", 3i64);
        let (sql, values) = criteria.to_sql::<Sample>().unwrap();
        assert_eq!(sql, "name = ?1 AND state IS NULL AND id = ?2");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_criteria_rejects_unknown_column() {
        let criteria = Criteria::new().eq("name; DROP TABLE sample", 1i64);
        let err = criteria.to_sql::<Sample>().unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError(_)));
    }

    #[test]
    fn test_empty_criteria_matches_all() {
        let criteria = Criteria::new();
        let (sql, values) = criteria.to_sql::<Sample>().unwrap();
        assert_eq!(sql, "1 = 1");
        assert!(values.is_empty());
    }

    #[test]
    fn test_date_value_format() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(date_value(d), Value::Text("2025-01-01".to_string()));
        let ts = d.and_hms_opt(8, 5, 9).unwrap();
        assert_eq!(datetime_value(ts), Value::Text("2025-01-01 08:05:09".to_string()));
    }
}
