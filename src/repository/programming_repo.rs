// ==========================================
// Procurement Engine - monthly_programming / consolidated_requirement
// ==========================================

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::Row;

use crate::domain::programming::{ConsolidatedRequirement, MonthlyProgramming};
use crate::domain::types::RequirementState;
use crate::repository::error::RepositoryResult;
use crate::repository::mapping::{
    date_value, datetime_value, get_date, get_datetime, get_json, get_parsed, opt_int, Criteria,
    TableMapping,
};
use crate::repository::sql_repository::SqlRepository;

pub type MonthlyProgrammingRepository<'c> = SqlRepository<'c, MonthlyProgramming>;
pub type ConsolidatedRequirementRepository<'c> = SqlRepository<'c, ConsolidatedRequirement>;

impl TableMapping for MonthlyProgramming {
    const ENTITY: &'static str = "MonthlyProgramming";
    const TABLE: &'static str = "monthly_programming";
    const COLUMNS: &'static [&'static str] =
        &["user_id", "contract_item_id", "month", "daily_quantities"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_values(&self) -> RepositoryResult<Vec<Value>> {
        Ok(vec![
            opt_int(self.user_id),
            Value::Integer(self.contract_item_id),
            date_value(self.month),
            Value::Text(serde_json::to_string(&self.daily_quantities)?),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(MonthlyProgramming {
            id: row.get(0)?,
            user_id: row.get(1)?,
            contract_item_id: row.get(2)?,
            month: get_date(row, 3)?,
            daily_quantities: get_json(row, 4, "daily_quantities")?,
        })
    }
}

impl<'c> MonthlyProgrammingRepository<'c> {
    /// All rows for one (already normalized) month.
    pub fn find_by_month(&self, month: NaiveDate) -> RepositoryResult<Vec<MonthlyProgramming>> {
        self.find_by(&Criteria::new().eq("month", date_value(month)))
    }

    /// All rows for one contract item, across every month.
    pub fn find_by_item(&self, item_id: i64) -> RepositoryResult<Vec<MonthlyProgramming>> {
        self.find_by(&Criteria::new().eq("contract_item_id", item_id))
    }

    pub fn find_for_item_month(
        &self,
        item_id: i64,
        month: NaiveDate,
    ) -> RepositoryResult<Option<MonthlyProgramming>> {
        self.find_one_by(
            &Criteria::new()
                .eq("contract_item_id", item_id)
                .eq("month", date_value(month)),
        )
    }
}

impl TableMapping for ConsolidatedRequirement {
    const ENTITY: &'static str = "ConsolidatedRequirement";
    const TABLE: &'static str = "consolidated_requirement";
    const COLUMNS: &'static [&'static str] = &["qr_id", "requested_by", "generated_at", "state"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_values(&self) -> RepositoryResult<Vec<Value>> {
        Ok(vec![
            Value::Text(self.qr_id.clone()),
            opt_int(self.requested_by),
            datetime_value(self.generated_at),
            Value::Text(self.state.to_db_str().to_string()),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ConsolidatedRequirement {
            id: row.get(0)?,
            qr_id: row.get(1)?,
            requested_by: row.get(2)?,
            generated_at: get_datetime(row, 3)?,
            state: get_parsed(row, 4, "state", RequirementState::from_str)?,
        })
    }
}

impl<'c> ConsolidatedRequirementRepository<'c> {
    pub fn find_by_qr_id(&self, qr_id: &str) -> RepositoryResult<Option<ConsolidatedRequirement>> {
        self.find_one_by(&Criteria::new().eq("qr_id", qr_id.to_string()))
    }
}
