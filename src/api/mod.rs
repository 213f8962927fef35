// ==========================================
// Procurement Engine - API layer
// ==========================================
// One service per actor; each call runs in its own unit of work
// ==========================================

pub mod auth_api;
pub mod contract_api;
pub mod error;
pub mod finance_api;
pub mod legal_api;
pub mod nutrition_api;
pub mod supplier_api;
pub mod warehouse_api;

pub use auth_api::{hash_password, verify_password, AuthApi, AuthenticatedUser};
pub use contract_api::{
    ContractApi, ContractDetail, ContractPayload, ContractSummary, OrderView, SupplierPayload,
};
pub use error::{ApiError, ApiResult};
pub use finance_api::{AccountingEntryView, FinanceApi, ReceiptFileView};
pub use legal_api::{LegalApi, NonCompliancePayload};
pub use nutrition_api::{ItemOption, NutritionApi, ProgrammingPayload, RequirementView};
pub use supplier_api::{DeliveryStatus, SupplierApi, SupplierOrderView};
pub use warehouse_api::{ReceiptPayload, ReceiptView, StockStatus, WarehouseApi};
