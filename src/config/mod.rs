// ==========================================
// Procurement Engine - configuration layer
// ==========================================
// Storage: config_kv table
// Readers depend on ProcurementConfigReader, not on ConfigManager
// ==========================================

pub mod config_manager;
pub mod procurement_config_trait;

pub use config_manager::{config_keys, ConfigManager};
pub use procurement_config_trait::ProcurementConfigReader;
