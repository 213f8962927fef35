// ==========================================
// Procurement Engine - application state
// ==========================================
// Wires the schema, the unit-of-work factory, configuration and
// every actor-facing API around one database file
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{
    ApiError, ApiResult, AuthApi, ContractApi, FinanceApi, LegalApi, NutritionApi, SupplierApi,
    WarehouseApi,
};
use crate::config::{ConfigManager, ProcurementConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::UnitOfWorkFactory;

/// Environment override for the database location.
pub const DB_PATH_ENV: &str = "PROCUREMENT_DB_PATH";

pub struct AppState {
    pub db_path: String,
    pub uow_factory: Arc<UnitOfWorkFactory>,
    pub config: Arc<ConfigManager>,

    pub auth_api: Arc<AuthApi>,
    pub contract_api: Arc<ContractApi>,
    pub supplier_api: Arc<SupplierApi>,
    pub warehouse_api: Arc<WarehouseApi>,
    pub finance_api: Arc<FinanceApi>,
    pub legal_api: Arc<LegalApi>,
    pub nutrition_api: Arc<NutritionApi>,
}

impl AppState {
    /// Open (or create) the database at `db_path` and build every service.
    pub fn new(db_path: impl Into<String>) -> ApiResult<Self> {
        let db_path = db_path.into();
        tracing::info!(db_path = %db_path, "initializing application state");

        {
            let conn = open_sqlite_connection(&db_path)
                .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
            init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        }

        let uow_factory = Arc::new(UnitOfWorkFactory::new(db_path.clone()));
        let config = Arc::new(ConfigManager::new(&db_path)?);
        let reader: Arc<dyn ProcurementConfigReader> = config.clone();

        Ok(Self {
            auth_api: Arc::new(AuthApi::new(uow_factory.clone())),
            contract_api: Arc::new(ContractApi::new(uow_factory.clone())),
            supplier_api: Arc::new(SupplierApi::new(uow_factory.clone())),
            warehouse_api: Arc::new(WarehouseApi::new(uow_factory.clone())),
            finance_api: Arc::new(FinanceApi::new(uow_factory.clone(), reader.clone())),
            legal_api: Arc::new(LegalApi::new(uow_factory.clone(), reader)),
            nutrition_api: Arc::new(NutritionApi::new(uow_factory.clone())),
            db_path,
            uow_factory,
            config,
        })
    }
}

/// Database location: `PROCUREMENT_DB_PATH`, else the user data dir,
/// else `./procurement.db`.
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./procurement.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        let dir = data_dir.join("procurement-engine-dev");
        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("procurement-engine");

        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("procurement.db"),
            Err(e) => tracing::warn!(error = %e, "data dir not writable, using working directory"),
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_new_creates_schema_and_services() {
        let file = NamedTempFile::new().unwrap();
        let state = AppState::new(file.path().to_str().unwrap()).unwrap();

        assert!(state.contract_api.list_contracts().unwrap().is_empty());
        assert_eq!(state.config.penalty_daily_rate().unwrap(), 150.0);
    }
}
