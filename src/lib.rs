// ==========================================
// Procurement Engine - core library
// ==========================================
// Contract-capped procurement lifecycle for institutional food supply:
// contracts -> monthly programming -> consolidated requirement -> dispatch,
// purchase order -> invoice -> receipt -> verification -> accounting.
// Stack: Rust + SQLite (rusqlite), one transaction per unit of work
// ==========================================

// Entities and state types
pub mod domain;

// Persistence gateway (unit of work + repositories)
pub mod repository;

// Business rules
pub mod engine;

// Catalog import (CSV / Excel)
pub mod importer;

// Settings stored in config_kv
pub mod config;

// Connection setup and schema
pub mod db;

pub mod logging;

// SQL and operation timing
pub mod perf;

// Actor-facing services
pub mod api;

// Service wiring and demo data
pub mod app;

// ==========================================
// Re-exports
// ==========================================

pub use domain::{
    AccountingEntry, ConsolidatedRequirement, Contract, ContractItem, MonthlyProgramming,
    OrderState, PurchaseOrder, RequirementState, Supplier, WarehouseReceipt,
};

pub use engine::{
    DispatchEngine, EngineError, OrderLifecycleEngine, PenaltyCalculator, ProgrammingEngine,
};

pub use api::{
    ApiError, ApiResult, AuthApi, ContractApi, FinanceApi, LegalApi, NutritionApi, SupplierApi,
    WarehouseApi,
};

pub use app::{get_default_db_path, AppState};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Procurement Engine";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
