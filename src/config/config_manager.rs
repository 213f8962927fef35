// ==========================================
// Procurement Engine - configuration manager
// ==========================================
// Responsibility: load, query and override settings
// Storage: config_kv table (key -> value)
// ==========================================

use crate::config::procurement_config_trait::ProcurementConfigReader;
use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub const DEFAULT_PENALTY_DAILY_RATE: f64 = 150.0;
pub const DEFAULT_LEDGER_DEBIT_ACCOUNT: &str = "6151-Inventario";
pub const DEFAULT_LEDGER_CREDIT_ACCOUNT: &str = "2112-Cuentas por Pagar a Corto Plazo";

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Open a dedicated connection to `db_path`.
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Reuse an existing connection; the shared PRAGMAs are applied again (idempotent).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }

        Ok(Self { conn })
    }

    fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Raw value for `key`, if set.
    pub fn get(&self, key: &str) -> RepositoryResult<Option<String>> {
        self.get_config_value(key)
    }

    /// Insert or overwrite one key.
    pub fn set(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(RepositoryError::ValidationError(
                "config key must not be empty".to_string(),
            ));
        }

        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(config_key = key, "config updated");
        Ok(())
    }

    /// Every stored key/value pair, sorted by key.
    pub fn snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;
        Ok(rows)
    }
}

// ==========================================
// ProcurementConfigReader for ConfigManager
// ==========================================
impl ProcurementConfigReader for ConfigManager {
    fn penalty_daily_rate(&self) -> RepositoryResult<f64> {
        let raw = self.get_config_or_default(
            config_keys::PENALTY_DAILY_RATE,
            &DEFAULT_PENALTY_DAILY_RATE.to_string(),
        )?;
        match raw.trim().parse::<f64>() {
            Ok(rate) if rate.is_finite() && rate >= 0.0 => Ok(rate),
            _ => {
                tracing::warn!(
                    config_key = config_keys::PENALTY_DAILY_RATE,
                    raw_value = %raw,
                    "invalid penalty rate, using default"
                );
                Ok(DEFAULT_PENALTY_DAILY_RATE)
            }
        }
    }

    fn ledger_debit_account(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::LEDGER_DEBIT_ACCOUNT, DEFAULT_LEDGER_DEBIT_ACCOUNT)
    }

    fn ledger_credit_account(&self) -> RepositoryResult<String> {
        self.get_config_or_default(
            config_keys::LEDGER_CREDIT_ACCOUNT,
            DEFAULT_LEDGER_CREDIT_ACCOUNT,
        )
    }
}

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    // Legal
    pub const PENALTY_DAILY_RATE: &str = "penalty_daily_rate";

    // Finance
    pub const LEDGER_DEBIT_ACCOUNT: &str = "ledger_debit_account";
    pub const LEDGER_CREDIT_ACCOUNT: &str = "ledger_credit_account";
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn manager() -> (NamedTempFile, ConfigManager) {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let conn = open_sqlite_connection(&path).unwrap();
        crate::db::init_schema(&conn).unwrap();
        (file, ConfigManager::new(&path).unwrap())
    }

    #[test]
    fn test_defaults_when_unset() {
        let (_file, config) = manager();
        assert_eq!(config.penalty_daily_rate().unwrap(), 150.0);
        assert_eq!(config.ledger_debit_account().unwrap(), "6151-Inventario");
        assert_eq!(
            config.ledger_credit_account().unwrap(),
            "2112-Cuentas por Pagar a Corto Plazo"
        );
    }

    #[test]
    fn test_set_overrides_and_upserts() {
        let (_file, config) = manager();
        config.set(config_keys::PENALTY_DAILY_RATE, "200").unwrap();
        config.set(config_keys::PENALTY_DAILY_RATE, "250.5").unwrap();
        assert_eq!(config.penalty_daily_rate().unwrap(), 250.5);
        assert_eq!(config.snapshot().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_rate_falls_back() {
        let (_file, config) = manager();
        config.set(config_keys::PENALTY_DAILY_RATE, "-3").unwrap();
        assert_eq!(config.penalty_daily_rate().unwrap(), DEFAULT_PENALTY_DAILY_RATE);
    }

    #[test]
    fn test_empty_key_rejected() {
        let (_file, config) = manager();
        assert!(config.set("  ", "x").is_err());
    }
}
