// ==========================================
// Procurement Engine - contract / contract_item tables
// ==========================================

use rusqlite::types::Value;
use rusqlite::Row;

use crate::domain::contract::{Contract, ContractItem};
use crate::repository::error::RepositoryResult;
use crate::repository::mapping::{date_value, get_date, opt_text, TableMapping};
use crate::repository::sql_repository::SqlRepository;

pub type ContractRepository<'c> = SqlRepository<'c, Contract>;
pub type ContractItemRepository<'c> = SqlRepository<'c, ContractItem>;

impl TableMapping for Contract {
    const ENTITY: &'static str = "Contract";
    const TABLE: &'static str = "contract";
    const COLUMNS: &'static [&'static str] =
        &["bid_code", "file_path", "start_date", "end_date", "supplier_id"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_values(&self) -> RepositoryResult<Vec<Value>> {
        Ok(vec![
            Value::Text(self.bid_code.clone()),
            opt_text(&self.file_path),
            date_value(self.start_date),
            date_value(self.end_date),
            Value::Integer(self.supplier_id),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Contract {
            id: row.get(0)?,
            bid_code: row.get(1)?,
            file_path: row.get(2)?,
            start_date: get_date(row, 3)?,
            end_date: get_date(row, 4)?,
            supplier_id: row.get(5)?,
        })
    }
}

impl TableMapping for ContractItem {
    const ENTITY: &'static str = "ContractItem";
    const TABLE: &'static str = "contract_item";
    const COLUMNS: &'static [&'static str] = &[
        "contract_id",
        "item_key",
        "description",
        "unit",
        "unit_price",
        "max_quantity",
        "consumed_quantity",
        "classification",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_values(&self) -> RepositoryResult<Vec<Value>> {
        Ok(vec![
            Value::Integer(self.contract_id),
            Value::Text(self.item_key.clone()),
            Value::Text(self.description.clone()),
            Value::Text(self.unit.clone()),
            Value::Real(self.unit_price),
            Value::Integer(self.max_quantity),
            Value::Integer(self.consumed_quantity),
            opt_text(&self.classification),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ContractItem {
            id: row.get(0)?,
            contract_id: row.get(1)?,
            item_key: row.get(2)?,
            description: row.get(3)?,
            unit: row.get(4)?,
            unit_price: row.get(5)?,
            max_quantity: row.get(6)?,
            consumed_quantity: row.get(7)?,
            classification: row.get(8)?,
        })
    }
}
