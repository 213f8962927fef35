// ==========================================
// Procurement Engine - legal API
// ==========================================
// Non-compliance reports and late-delivery penalties
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ProcurementConfigReader;
use crate::domain::{NonComplianceReport, PenaltyBreakdown, NON_COMPLIANCE_RESOLVED};
use crate::engine::PenaltyCalculator;
use crate::perf::PerfGuard;
use crate::repository::UnitOfWorkFactory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonCompliancePayload {
    pub contract_id: i64,
    pub report_type: String,
    pub state: String,
    pub description: Option<String>,
}

pub struct LegalApi {
    uow_factory: Arc<UnitOfWorkFactory>,
    config: Arc<dyn ProcurementConfigReader>,
}

impl LegalApi {
    pub fn new(uow_factory: Arc<UnitOfWorkFactory>, config: Arc<dyn ProcurementConfigReader>) -> Self {
        Self {
            uow_factory,
            config,
        }
    }

    pub fn register_non_compliance(
        &self,
        payload: &NonCompliancePayload,
    ) -> ApiResult<NonComplianceReport> {
        let _perf = PerfGuard::new("legal_api.register_non_compliance");
        let report_type = payload.report_type.trim().to_uppercase();
        let state = payload.state.trim().to_uppercase();
        if report_type.is_empty() || state.is_empty() {
            return Err(ApiError::InvalidInput(
                "report type and state are required".to_string(),
            ));
        }

        self.uow_factory.run(|uow| {
            uow.contracts().require(payload.contract_id)?;

            let mut report = NonComplianceReport {
                id: 0,
                contract_id: payload.contract_id,
                report_type: report_type.clone(),
                state: state.clone(),
                description: payload.description.clone(),
            };
            uow.non_compliance_reports().add(&mut report)?;
            info!(
                report_id = report.id,
                contract_id = report.contract_id,
                report_type = %report.report_type,
                "non-compliance registered"
            );
            Ok(report)
        })
    }

    /// Every report not yet RESOLVED.
    pub fn list_open_non_compliance(&self) -> ApiResult<Vec<NonComplianceReport>> {
        let _perf = PerfGuard::new("legal_api.list_open_non_compliance");
        self.uow_factory.read(|uow| {
            Ok(uow
                .non_compliance_reports()
                .list()?
                .into_iter()
                .filter(NonComplianceReport::is_open)
                .collect())
        })
    }

    /// Close a report by moving it to RESOLVED.
    pub fn resolve_non_compliance(&self, report_id: i64) -> ApiResult<NonComplianceReport> {
        let _perf = PerfGuard::new("legal_api.resolve_non_compliance");
        self.uow_factory.run(|uow| {
            let mut report = uow.non_compliance_reports().require(report_id)?;
            report.state = NON_COMPLIANCE_RESOLVED.to_string();
            uow.non_compliance_reports().update(&report)?;
            Ok(report)
        })
    }

    pub fn calculate_late_penalty(&self, order_id: i64) -> ApiResult<PenaltyBreakdown> {
        let _perf = PerfGuard::new("legal_api.calculate_late_penalty");
        let calculator = PenaltyCalculator::new(self.config.penalty_daily_rate()?);
        self.uow_factory
            .read(|uow| Ok(calculator.calculate_late_penalty(uow, order_id)?))
    }
}
