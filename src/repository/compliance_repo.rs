// ==========================================
// Procurement Engine - non_compliance_report table
// ==========================================

use rusqlite::types::Value;
use rusqlite::Row;

use crate::domain::compliance::NonComplianceReport;
use crate::repository::error::RepositoryResult;
use crate::repository::mapping::{opt_text, TableMapping};
use crate::repository::sql_repository::SqlRepository;

pub type NonComplianceRepository<'c> = SqlRepository<'c, NonComplianceReport>;

impl TableMapping for NonComplianceReport {
    const ENTITY: &'static str = "NonComplianceReport";
    const TABLE: &'static str = "non_compliance_report";
    const COLUMNS: &'static [&'static str] = &["contract_id", "report_type", "state", "description"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_values(&self) -> RepositoryResult<Vec<Value>> {
        Ok(vec![
            Value::Integer(self.contract_id),
            Value::Text(self.report_type.clone()),
            Value::Text(self.state.clone()),
            opt_text(&self.description),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(NonComplianceReport {
            id: row.get(0)?,
            contract_id: row.get(1)?,
            report_type: row.get(2)?,
            state: row.get(3)?,
            description: row.get(4)?,
        })
    }
}
