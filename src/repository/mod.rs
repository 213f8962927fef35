// ==========================================
// Procurement Engine - persistence gateway
// ==========================================
// Responsibility: typed repositories sharing one transactional scope
// Rule: repositories hold no business logic; all SQL is parameterized
// ==========================================

pub mod compliance_repo;
pub mod contract_repo;
pub mod error;
pub mod mapping;
pub mod order_repo;
pub mod party_repo;
pub mod programming_repo;
pub mod sql_repository;
pub mod unit_of_work;

pub use compliance_repo::NonComplianceRepository;
pub use contract_repo::{ContractItemRepository, ContractRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use mapping::{Criteria, TableMapping};
pub use order_repo::{AccountingEntryRepository, PurchaseOrderRepository, WarehouseReceiptRepository};
pub use party_repo::{RoleRepository, SupplierRepository, UserRepository};
pub use programming_repo::{ConsolidatedRequirementRepository, MonthlyProgrammingRepository};
pub use sql_repository::SqlRepository;
pub use unit_of_work::{UnitOfWork, UnitOfWorkFactory};
