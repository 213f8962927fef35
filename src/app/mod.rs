// ==========================================
// Procurement Engine - application layer
// ==========================================
// Builds the shared services for a host process (CLI, GUI, server)
// ==========================================

pub mod seed;
pub mod state;

pub use seed::{seed_demo_data, SeedSummary, DEMO_PASSWORD};
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
