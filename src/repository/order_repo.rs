// ==========================================
// Procurement Engine - purchase_order / warehouse_receipt / accounting_entry
// ==========================================

use rusqlite::types::Value;
use rusqlite::Row;

use crate::domain::order::{AccountingEntry, PurchaseOrder, WarehouseReceipt};
use crate::domain::types::OrderState;
use crate::repository::error::RepositoryResult;
use crate::repository::mapping::{
    date_value, datetime_value, get_date, get_datetime, get_parsed, opt_int, opt_text,
    Criteria, TableMapping,
};
use crate::repository::sql_repository::SqlRepository;

pub type PurchaseOrderRepository<'c> = SqlRepository<'c, PurchaseOrder>;
pub type WarehouseReceiptRepository<'c> = SqlRepository<'c, WarehouseReceipt>;
pub type AccountingEntryRepository<'c> = SqlRepository<'c, AccountingEntry>;

impl TableMapping for PurchaseOrder {
    const ENTITY: &'static str = "PurchaseOrder";
    const TABLE: &'static str = "purchase_order";
    const COLUMNS: &'static [&'static str] = &["contract_id", "scheduled_delivery", "state"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_values(&self) -> RepositoryResult<Vec<Value>> {
        Ok(vec![
            Value::Integer(self.contract_id),
            date_value(self.scheduled_delivery),
            Value::Text(self.state.to_db_str().to_string()),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PurchaseOrder {
            id: row.get(0)?,
            contract_id: row.get(1)?,
            scheduled_delivery: get_date(row, 2)?,
            state: get_parsed(row, 3, "state", OrderState::from_str)?,
        })
    }
}

impl<'c> PurchaseOrderRepository<'c> {
    pub fn find_by_state(&self, state: OrderState) -> RepositoryResult<Vec<PurchaseOrder>> {
        self.find_by(&Criteria::new().eq("state", state.to_db_str().to_string()))
    }
}

impl TableMapping for WarehouseReceipt {
    const ENTITY: &'static str = "WarehouseReceipt";
    const TABLE: &'static str = "warehouse_receipt";
    const COLUMNS: &'static [&'static str] = &[
        "folio",
        "purchase_order_id",
        "received_at",
        "invoice_path",
        "receiver_id",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_values(&self) -> RepositoryResult<Vec<Value>> {
        Ok(vec![
            Value::Text(self.folio.clone()),
            Value::Integer(self.purchase_order_id),
            datetime_value(self.received_at),
            opt_text(&self.invoice_path),
            opt_int(self.receiver_id),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(WarehouseReceipt {
            id: row.get(0)?,
            folio: row.get(1)?,
            purchase_order_id: row.get(2)?,
            received_at: get_datetime(row, 3)?,
            invoice_path: row.get(4)?,
            receiver_id: row.get(5)?,
        })
    }
}

impl<'c> WarehouseReceiptRepository<'c> {
    pub fn find_by_order(&self, order_id: i64) -> RepositoryResult<Option<WarehouseReceipt>> {
        self.find_one_by(&Criteria::new().eq("purchase_order_id", order_id))
    }

    pub fn find_by_folio(&self, folio: &str) -> RepositoryResult<Option<WarehouseReceipt>> {
        self.find_one_by(&Criteria::new().eq("folio", folio.to_string()))
    }
}

impl TableMapping for AccountingEntry {
    const ENTITY: &'static str = "AccountingEntry";
    const TABLE: &'static str = "accounting_entry";
    const COLUMNS: &'static [&'static str] = &[
        "warehouse_receipt_id",
        "ledger_line",
        "accountant_id",
        "posted_at",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_values(&self) -> RepositoryResult<Vec<Value>> {
        Ok(vec![
            opt_int(self.warehouse_receipt_id),
            Value::Text(self.ledger_line.clone()),
            opt_int(self.accountant_id),
            datetime_value(self.posted_at),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(AccountingEntry {
            id: row.get(0)?,
            warehouse_receipt_id: row.get(1)?,
            ledger_line: row.get(2)?,
            accountant_id: row.get(3)?,
            posted_at: get_datetime(row, 4)?,
        })
    }
}

impl<'c> AccountingEntryRepository<'c> {
    pub fn find_by_receipt(&self, receipt_id: i64) -> RepositoryResult<Option<AccountingEntry>> {
        self.find_one_by(&Criteria::new().eq("warehouse_receipt_id", receipt_id))
    }
}
