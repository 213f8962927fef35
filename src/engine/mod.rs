// ==========================================
// Procurement Engine - engine layer
// ==========================================
// Responsibility: business rules of the procurement lifecycle
// Rule: engines build no SQL and never commit; they work on the
// caller's open UnitOfWork and return typed errors
// ==========================================

pub mod dispatch;
pub mod error;
pub mod identifiers;
pub mod order_lifecycle;
pub mod penalty;
pub mod programming;

pub use dispatch::{DispatchEngine, DispatchSummary};
pub use error::{EngineError, EngineResult};
pub use identifiers::{generate_folio, generate_qr_id, ledger_line, parse_qr_month};
pub use order_lifecycle::{LedgerAccounts, OrderLifecycleEngine};
pub use penalty::PenaltyCalculator;
pub use programming::{ItemAvailability, ProgrammingEngine};
