// ==========================================
// Procurement Engine - nutrition API
// ==========================================
// Monthly programming, availability checks, consolidation
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::domain::{ContractItem, DailyQuantities, MonthlyProgramming, RequirementState};
use crate::engine::{ItemAvailability, ProgrammingEngine};
use crate::perf::PerfGuard;
use crate::repository::UnitOfWorkFactory;

/// Item entry for pick lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOption {
    pub id: i64,
    pub item_key: String,
    pub description: String,
    pub unit: String,
}

impl From<ContractItem> for ItemOption {
    fn from(item: ContractItem) -> Self {
        Self {
            id: item.id,
            item_key: item.item_key,
            description: item.description,
            unit: item.unit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgrammingPayload {
    pub user_id: Option<i64>,
    pub contract_item_id: i64,
    /// Any day of the target month; stored as day 1
    pub month: NaiveDate,
    pub daily_quantities: DailyQuantities,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementView {
    pub id: i64,
    pub qr_id: String,
    pub requested_by: Option<i64>,
    pub generated_at: NaiveDateTime,
    pub state: RequirementState,
}

pub struct NutritionApi {
    uow_factory: Arc<UnitOfWorkFactory>,
    engine: ProgrammingEngine,
}

impl NutritionApi {
    pub fn new(uow_factory: Arc<UnitOfWorkFactory>) -> Self {
        Self {
            uow_factory,
            engine: ProgrammingEngine::new(),
        }
    }

    pub fn list_available_items(&self) -> ApiResult<Vec<ItemOption>> {
        let _perf = PerfGuard::new("nutrition_api.list_available_items");
        self.uow_factory.read(|uow| {
            Ok(uow
                .contract_items()
                .list()?
                .into_iter()
                .map(ItemOption::from)
                .collect())
        })
    }

    pub fn save_programming(&self, payload: &ProgrammingPayload) -> ApiResult<MonthlyProgramming> {
        let _perf = PerfGuard::new("nutrition_api.save_programming");
        self.uow_factory.run(|uow| {
            Ok(self.engine.save_programming(
                uow,
                payload.user_id,
                payload.contract_item_id,
                payload.month,
                payload.daily_quantities.clone(),
            )?)
        })
    }

    /// Advisory: nothing is reserved between this check and a later save.
    pub fn check_availability(&self, item_id: i64, requested_month_total: i64) -> ApiResult<bool> {
        let _perf = PerfGuard::new("nutrition_api.check_availability");
        self.uow_factory.read(|uow| {
            Ok(self
                .engine
                .check_availability(uow, item_id, requested_month_total)?)
        })
    }

    pub fn availability(&self, item_id: i64) -> ApiResult<ItemAvailability> {
        let _perf = PerfGuard::new("nutrition_api.availability");
        self.uow_factory
            .read(|uow| Ok(self.engine.availability(uow, item_id)?))
    }

    pub fn consolidate(&self, month: NaiveDate, requested_by: Option<i64>) -> ApiResult<RequirementView> {
        self.consolidate_at(month, requested_by, Utc::now().naive_utc())
    }

    pub fn consolidate_at(
        &self,
        month: NaiveDate,
        requested_by: Option<i64>,
        generated_at: NaiveDateTime,
    ) -> ApiResult<RequirementView> {
        let _perf = PerfGuard::new("nutrition_api.consolidate");
        self.uow_factory.run(|uow| {
            let r = self.engine.consolidate(uow, month, requested_by, generated_at)?;
            Ok(RequirementView {
                id: r.id,
                qr_id: r.qr_id,
                requested_by: r.requested_by,
                generated_at: r.generated_at,
                state: r.state,
            })
        })
    }
}
