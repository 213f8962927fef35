// ==========================================
// Procurement Engine - configuration reader trait
// ==========================================
// Read-only view used by the application services.
// No writes and no business rules here.
// ==========================================

use crate::repository::error::RepositoryResult;

// ==========================================
// ProcurementConfigReader
// ==========================================
// Implemented by ConfigManager (config_kv) and by test mocks
pub trait ProcurementConfigReader: Send + Sync {
    // ===== Legal =====

    /// Flat late-delivery penalty per day.
    ///
    /// # Default
    /// - 150.0
    fn penalty_daily_rate(&self) -> RepositoryResult<f64>;

    // ===== Finance =====

    /// Debit account embedded in every ledger line.
    ///
    /// # Default
    /// - `6151-Inventario`
    fn ledger_debit_account(&self) -> RepositoryResult<String>;

    /// Credit account embedded in every ledger line.
    ///
    /// # Default
    /// - `2112-Cuentas por Pagar a Corto Plazo`
    fn ledger_credit_account(&self) -> RepositoryResult<String>;
}
