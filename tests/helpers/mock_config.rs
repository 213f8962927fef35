// ==========================================
// Mock configuration for integration tests
// ==========================================

use procurement_engine::config::ProcurementConfigReader;
use procurement_engine::repository::RepositoryResult;

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub penalty_daily_rate: f64,
    pub debit_account: String,
    pub credit_account: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            penalty_daily_rate: 150.0,
            debit_account: "6151-Inventario".to_string(),
            credit_account: "2112-Cuentas por Pagar a Corto Plazo".to_string(),
        }
    }
}

impl MockConfig {
    pub fn with_rate(rate: f64) -> Self {
        Self {
            penalty_daily_rate: rate,
            ..Self::default()
        }
    }
}

impl ProcurementConfigReader for MockConfig {
    fn penalty_daily_rate(&self) -> RepositoryResult<f64> {
        Ok(self.penalty_daily_rate)
    }

    fn ledger_debit_account(&self) -> RepositoryResult<String> {
        Ok(self.debit_account.clone())
    }

    fn ledger_credit_account(&self) -> RepositoryResult<String> {
        Ok(self.credit_account.clone())
    }
}
