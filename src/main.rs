// ==========================================
// Procurement Engine - command line entry
// ==========================================
// Usage: procurement-engine [DB_PATH] [--seed]
// Opens (or creates) the database and prints a short status report.
// ==========================================

use std::process::ExitCode;

use procurement_engine::app::{get_default_db_path, seed_demo_data, AppState};
use procurement_engine::{logging, ApiResult, APP_NAME, VERSION};

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> ApiResult<()> {
    let mut seed = false;
    let mut db_path = None;
    for arg in std::env::args().skip(1) {
        if arg == "--seed" {
            seed = true;
        } else {
            db_path = Some(arg);
        }
    }
    let db_path = db_path.unwrap_or_else(get_default_db_path);

    tracing::info!(version = VERSION, "{}", APP_NAME);
    let state = AppState::new(db_path)?;

    if seed {
        let summary = seed_demo_data(&state)?;
        println!(
            "seeded: {} roles, {} users, {} suppliers, {} contract items",
            summary.roles, summary.users, summary.suppliers, summary.contract_items
        );
    }

    let contracts = state.contract_api.list_contracts()?;
    let pending = state.contract_api.list_orders_pending_approval()?;
    let stock = state.warehouse_api.stock_status()?;

    println!("database:          {}", state.db_path);
    println!("contracts:         {}", contracts.len());
    println!("orders to approve: {}", pending.len());
    for item in stock {
        println!(
            "  {:<8} {:<30} {:>7} / {:>7} {}",
            item.item_key, item.description, item.consumed_quantity, item.max_quantity, item.unit
        );
    }
    Ok(())
}
