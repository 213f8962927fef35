// ==========================================
// Procurement Engine - domain layer
// ==========================================
// Entities and state types only: no SQL, no engine rules
// ==========================================

pub mod compliance;
pub mod contract;
pub mod order;
pub mod party;
pub mod programming;
pub mod types;

pub use compliance::{NonComplianceReport, PenaltyBreakdown, NON_COMPLIANCE_RESOLVED};
pub use contract::{Contract, ContractItem, ContractItemInput};
pub use order::{AccountingEntry, OrderProposal, PurchaseOrder, WarehouseReceipt};
pub use party::{Role, Supplier, User};
pub use programming::{
    normalize_month, total_quantity, ConsolidatedRequirement, DailyQuantities, MonthlyProgramming,
};
pub use types::{OrderState, RequirementState};
