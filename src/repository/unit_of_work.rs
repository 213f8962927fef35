// ==========================================
// Procurement Engine - unit of work
// ==========================================
// One scope = one connection = one transaction.
// - open(): fresh session + BEGIN IMMEDIATE
// - open_read(): fresh session + deferred BEGIN, for queries
// - commit()/rollback(): idempotent once the scope is closed
// - drop while open: rollback
// The scope owns a rusqlite::Connection plus a Cell flag, so it is !Sync
// and its repositories cannot be shared across threads.
// ==========================================

use std::cell::Cell;

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::db::open_sqlite_connection;
use crate::domain::{
    AccountingEntry, ConsolidatedRequirement, Contract, ContractItem, MonthlyProgramming,
    NonComplianceReport, PurchaseOrder, Role, Supplier, User, WarehouseReceipt,
};
use crate::perf::install_sqlite_tracing;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::mapping::TableMapping;
use crate::repository::sql_repository::SqlRepository;

// ==========================================
// UnitOfWorkFactory
// ==========================================
/// Hands out independent scopes against one database file.
#[derive(Debug, Clone)]
pub struct UnitOfWorkFactory {
    db_path: String,
}

impl UnitOfWorkFactory {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Open a new scope bound to a fresh session and transaction.
    pub fn open(&self) -> RepositoryResult<UnitOfWork> {
        UnitOfWork::begin(self.connect()?)
    }

    /// Open a scope that takes no lock until its first statement.
    ///
    /// Readers see one consistent snapshot and never queue behind writers.
    pub fn open_read(&self) -> RepositoryResult<UnitOfWork> {
        UnitOfWork::begin_deferred(self.connect()?)
    }

    fn connect(&self) -> RepositoryResult<Connection> {
        let mut conn = open_sqlite_connection(&self.db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        install_sqlite_tracing(&mut conn);
        Ok(conn)
    }

    /// Run `work` inside one scope: commit on Ok, roll back on Err.
    ///
    /// The rollback happens before the error is handed back to the caller.
    pub fn run<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&UnitOfWork) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let uow = self.open()?;
        Self::finish(uow, work)
    }

    /// Run a query-only `work` inside a deferred scope.
    pub fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&UnitOfWork) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let uow = self.open_read()?;
        Self::finish(uow, work)
    }

    fn finish<T, E, F>(uow: UnitOfWork, work: F) -> Result<T, E>
    where
        F: FnOnce(&UnitOfWork) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        match work(&uow) {
            Ok(value) => {
                uow.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback() {
                    warn!(error = %rollback_err, "rollback after failed unit of work also failed");
                }
                Err(err)
            }
        }
    }
}

// ==========================================
// UnitOfWork
// ==========================================
pub struct UnitOfWork {
    conn: Connection,
    open: Cell<bool>,
}

impl UnitOfWork {
    /// Start an IMMEDIATE transaction on `conn`.
    ///
    /// IMMEDIATE takes the write lock up front, so two scopes racing on the
    /// same row serialize instead of both reading the old state.
    pub fn begin(conn: Connection) -> RepositoryResult<Self> {
        Self::begin_with(conn, "BEGIN IMMEDIATE")
    }

    /// Start a deferred transaction: the lock is taken lazily on first use.
    pub fn begin_deferred(conn: Connection) -> RepositoryResult<Self> {
        Self::begin_with(conn, "BEGIN DEFERRED")
    }

    fn begin_with(conn: Connection, statement: &str) -> RepositoryResult<Self> {
        conn.execute_batch(statement)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        debug!(statement, "unit of work opened");
        Ok(Self {
            conn,
            open: Cell::new(true),
        })
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn commit(&self) -> RepositoryResult<()> {
        if !self.open.get() {
            return Ok(());
        }
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        self.open.set(false);
        debug!("unit of work committed");
        Ok(())
    }

    pub fn rollback(&self) -> RepositoryResult<()> {
        if !self.open.get() {
            return Ok(());
        }
        self.open.set(false);
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        debug!("unit of work rolled back");
        Ok(())
    }

    /// Raw session access for schema/seed work inside the same transaction.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn repo<E: TableMapping>(&self) -> SqlRepository<'_, E> {
        SqlRepository::new(&self.conn, &self.open)
    }

    // ===== Repositories =====

    pub fn roles(&self) -> SqlRepository<'_, Role> {
        self.repo()
    }

    pub fn users(&self) -> SqlRepository<'_, User> {
        self.repo()
    }

    pub fn suppliers(&self) -> SqlRepository<'_, Supplier> {
        self.repo()
    }

    pub fn contracts(&self) -> SqlRepository<'_, Contract> {
        self.repo()
    }

    pub fn contract_items(&self) -> SqlRepository<'_, ContractItem> {
        self.repo()
    }

    pub fn purchase_orders(&self) -> SqlRepository<'_, PurchaseOrder> {
        self.repo()
    }

    pub fn warehouse_receipts(&self) -> SqlRepository<'_, WarehouseReceipt> {
        self.repo()
    }

    pub fn accounting_entries(&self) -> SqlRepository<'_, AccountingEntry> {
        self.repo()
    }

    pub fn monthly_programmings(&self) -> SqlRepository<'_, MonthlyProgramming> {
        self.repo()
    }

    pub fn requirements(&self) -> SqlRepository<'_, ConsolidatedRequirement> {
        self.repo()
    }

    pub fn non_compliance_reports(&self) -> SqlRepository<'_, NonComplianceReport> {
        self.repo()
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.open.get() {
            if let Err(e) = self.rollback() {
                warn!(error = %e, "rollback on drop failed");
            }
        }
    }
}
