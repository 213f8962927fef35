use anyhow::Context;
use chrono::Local;
use std::fs;
use std::path::Path;

use procurement_engine::api::ApiResult;
use procurement_engine::app::{get_default_db_path, seed_demo_data, AppState};
use procurement_engine::logging;

fn main() -> ApiResult<()> {
    logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);

    backup_and_reset_db(&db_path)?;

    let state = AppState::new(db_path.clone())?;
    let summary = seed_demo_data(&state)?;

    eprintln!("Seeded {}", db_path);
    eprintln!("  roles:          {}", summary.roles);
    eprintln!("  users:          {}", summary.users);
    eprintln!("  suppliers:      {}", summary.suppliers);
    eprintln!("  contract items: {}", summary.contract_items);
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> ApiResult<()> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)
        .with_context(|| format!("backing up {} to {}", db_path, backup_path))?;
    fs::remove_file(path).with_context(|| format!("removing {}", db_path))?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}
