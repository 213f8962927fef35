// ==========================================
// Procurement Engine - SQLite connection setup and schema
// ==========================================
// Every Connection::open goes through here so that foreign keys and
// busy_timeout are configured the same way on all sessions
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (ms)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// schema_version written by `init_schema`
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Per-connection PRAGMAs.
///
/// foreign_keys and busy_timeout are connection scoped in SQLite, so this
/// has to run for every new session.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a connection and apply the shared configuration.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Read schema_version (None when the table does not exist yet).
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Create every table (idempotent) and stamp the schema version.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    match read_schema_version(conn)? {
        Some(v) if v > CURRENT_SCHEMA_VERSION => tracing::warn!(
            db_version = v,
            expected = CURRENT_SCHEMA_VERSION,
            "database schema is newer than this build"
        ),
        _ => {}
    }
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS role (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    permissions TEXT NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS app_user (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role_id INTEGER REFERENCES role(id)
);

CREATE TABLE IF NOT EXISTS supplier (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    legal_name TEXT NOT NULL,
    tax_id TEXT NOT NULL UNIQUE,
    contact_email TEXT
);

CREATE TABLE IF NOT EXISTS contract (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bid_code TEXT NOT NULL UNIQUE,
    file_path TEXT,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    supplier_id INTEGER NOT NULL REFERENCES supplier(id),
    CHECK (end_date >= start_date)
);

CREATE TABLE IF NOT EXISTS contract_item (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    contract_id INTEGER NOT NULL REFERENCES contract(id) ON DELETE CASCADE,
    item_key TEXT NOT NULL,
    description TEXT NOT NULL,
    unit TEXT NOT NULL,
    unit_price REAL NOT NULL,
    max_quantity INTEGER NOT NULL,
    consumed_quantity INTEGER NOT NULL DEFAULT 0 CHECK (consumed_quantity >= 0),
    classification TEXT
);

CREATE TABLE IF NOT EXISTS purchase_order (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    contract_id INTEGER NOT NULL REFERENCES contract(id),
    scheduled_delivery TEXT NOT NULL,
    state TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS warehouse_receipt (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    folio TEXT NOT NULL UNIQUE,
    purchase_order_id INTEGER NOT NULL UNIQUE REFERENCES purchase_order(id),
    received_at TEXT NOT NULL,
    invoice_path TEXT,
    receiver_id INTEGER REFERENCES app_user(id)
);

CREATE TABLE IF NOT EXISTS accounting_entry (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    warehouse_receipt_id INTEGER UNIQUE REFERENCES warehouse_receipt(id),
    ledger_line TEXT NOT NULL,
    accountant_id INTEGER REFERENCES app_user(id),
    posted_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS monthly_programming (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER REFERENCES app_user(id),
    contract_item_id INTEGER NOT NULL REFERENCES contract_item(id),
    month TEXT NOT NULL,
    daily_quantities TEXT NOT NULL,
    UNIQUE (contract_item_id, month)
);

CREATE TABLE IF NOT EXISTS consolidated_requirement (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    qr_id TEXT NOT NULL UNIQUE,
    requested_by INTEGER REFERENCES app_user(id),
    generated_at TEXT NOT NULL,
    state TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS non_compliance_report (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    contract_id INTEGER NOT NULL REFERENCES contract(id),
    report_type TEXT NOT NULL,
    state TEXT NOT NULL,
    description TEXT
);

CREATE INDEX IF NOT EXISTS idx_purchase_order_state ON purchase_order(state);
CREATE INDEX IF NOT EXISTS idx_monthly_programming_month ON monthly_programming(month);
CREATE INDEX IF NOT EXISTS idx_contract_item_contract ON contract_item(contract_id);
"#;
