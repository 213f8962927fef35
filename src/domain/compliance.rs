// ==========================================
// Procurement Engine - legal: non-compliance and penalties
// ==========================================

use serde::{Deserialize, Serialize};

/// Report state that closes a non-compliance case.
pub const NON_COMPLIANCE_RESOLVED: &str = "RESOLVED";

/// Audit record; not part of the order state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonComplianceReport {
    pub id: i64,
    pub contract_id: i64,
    pub report_type: String, // e.g. QUALITY, DELAY
    pub state: String,       // e.g. PENDING, UNDER_REVIEW, RESOLVED
    pub description: Option<String>,
}

impl NonComplianceReport {
    pub fn is_open(&self) -> bool {
        !self.state.eq_ignore_ascii_case(NON_COMPLIANCE_RESOLVED)
    }
}

/// Late-delivery penalty for one purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyBreakdown {
    pub order_id: i64,
    pub days_late: i64,
    pub amount: f64,
    pub detail: String,
}
