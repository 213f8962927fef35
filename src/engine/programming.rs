// ==========================================
// Procurement Engine - monthly programming and consolidation
// ==========================================
// save_programming: upsert per (contract item, month)
// check_availability: advisory only, no lock held until the save
// consolidate: one PENDING requirement per call
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::domain::{
    normalize_month, ConsolidatedRequirement, DailyQuantities, MonthlyProgramming,
    RequirementState,
};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::identifiers::generate_qr_id;
use crate::repository::UnitOfWork;

/// Availability snapshot for one contract item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemAvailability {
    pub item_id: i64,
    pub max_quantity: i64,
    pub consumed_quantity: i64,
    /// Sum over every programmed month of the item
    pub programmed_quantity: i64,
}

impl ItemAvailability {
    /// max - consumed - programmed; may be negative when over-programmed.
    pub fn available(&self) -> i64 {
        self.max_quantity - self.consumed_quantity - self.programmed_quantity
    }

    pub fn allows(&self, requested_month_total: i64) -> bool {
        requested_month_total <= self.available()
    }
}

#[derive(Debug, Default)]
pub struct ProgrammingEngine;

impl ProgrammingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Create or overwrite the programming of `item_id` for `month`.
    ///
    /// On overwrite both the daily map and the owning user are replaced.
    pub fn save_programming(
        &self,
        uow: &UnitOfWork,
        user_id: Option<i64>,
        item_id: i64,
        month: NaiveDate,
        daily_quantities: DailyQuantities,
    ) -> EngineResult<MonthlyProgramming> {
        validate_daily_quantities(&daily_quantities)?;
        let month = normalize_month(month);

        let repo = uow.monthly_programmings();
        if let Some(mut existing) = repo.find_for_item_month(item_id, month)? {
            existing.daily_quantities = daily_quantities;
            existing.user_id = user_id;
            repo.update(&existing)?;

            info!(
                programming_id = existing.id,
                item_id,
                month = %month,
                total = existing.total(),
                "monthly programming updated"
            );
            return Ok(existing);
        }

        uow.contract_items().require(item_id)?;

        let mut programming = MonthlyProgramming {
            id: 0,
            user_id,
            contract_item_id: item_id,
            month,
            daily_quantities,
        };
        repo.add(&mut programming)?;

        info!(
            programming_id = programming.id,
            item_id,
            month = %month,
            total = programming.total(),
            "monthly programming created"
        );
        Ok(programming)
    }

    pub fn availability(&self, uow: &UnitOfWork, item_id: i64) -> EngineResult<ItemAvailability> {
        let item = uow.contract_items().require(item_id)?;
        let programmed_quantity = uow
            .monthly_programmings()
            .find_by_item(item_id)?
            .iter()
            .map(MonthlyProgramming::total)
            .sum();

        Ok(ItemAvailability {
            item_id,
            max_quantity: item.max_quantity,
            consumed_quantity: item.consumed_quantity,
            programmed_quantity,
        })
    }

    /// Whether `requested_month_total` still fits under the item cap.
    ///
    /// Every programmed month counts against the cap, including the one
    /// being re-planned.
    pub fn check_availability(
        &self,
        uow: &UnitOfWork,
        item_id: i64,
        requested_month_total: i64,
    ) -> EngineResult<bool> {
        let availability = self.availability(uow, item_id)?;
        let ok = availability.allows(requested_month_total);
        debug!(
            item_id,
            requested_month_total,
            available = availability.available(),
            ok,
            "availability checked"
        );
        Ok(ok)
    }

    /// Consolidate all programming of `month` into one dispatchable requirement.
    pub fn consolidate(
        &self,
        uow: &UnitOfWork,
        month: NaiveDate,
        requested_by: Option<i64>,
        generated_at: NaiveDateTime,
    ) -> EngineResult<ConsolidatedRequirement> {
        let month = normalize_month(month);
        let rows = uow.monthly_programmings().find_by_month(month)?;
        if rows.is_empty() {
            warn!(month = %month, "nothing programmed, consolidation refused");
            return Err(EngineError::not_found(
                "MonthlyProgramming",
                format!("month {}", month.format("%Y-%m")),
            ));
        }

        let mut requirement = ConsolidatedRequirement {
            id: 0,
            qr_id: generate_qr_id(month),
            requested_by,
            generated_at,
            state: RequirementState::Pending,
        };
        uow.requirements().add(&mut requirement)?;

        info!(
            qr_id = %requirement.qr_id,
            month = %month,
            rows = rows.len(),
            total = rows.iter().map(MonthlyProgramming::total).sum::<i64>(),
            "requirement consolidated"
        );
        Ok(requirement)
    }
}

fn validate_daily_quantities(daily: &DailyQuantities) -> EngineResult<()> {
    for (&day, &qty) in daily {
        if !(1..=31).contains(&day) {
            return Err(EngineError::Validation(format!(
                "day-of-month {} out of range 1..=31",
                day
            )));
        }
        if qty < 0 {
            return Err(EngineError::Validation(format!(
                "negative quantity {} on day {}",
                qty, day
            )));
        }
    }
    if daily
        .values()
        .try_fold(0i64, |acc, &qty| acc.checked_add(qty))
        .is_none()
    {
        return Err(EngineError::Validation("monthly total overflows".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_daily_quantities() {
        let mut daily = DailyQuantities::new();
        daily.insert(1, 10);
        daily.insert(31, 0);
        assert!(validate_daily_quantities(&daily).is_ok());

        daily.insert(32, 1);
        assert!(matches!(
            validate_daily_quantities(&daily),
            Err(EngineError::Validation(_))
        ));

        let mut daily = DailyQuantities::new();
        daily.insert(5, -1);
        assert!(validate_daily_quantities(&daily).is_err());

        let mut daily = DailyQuantities::new();
        daily.insert(0, 1);
        assert!(validate_daily_quantities(&daily).is_err());
    }

    #[test]
    fn test_availability_math() {
        let a = ItemAvailability {
            item_id: 1,
            max_quantity: 5000,
            consumed_quantity: 0,
            programmed_quantity: 4000,
        };
        assert_eq!(a.available(), 1000);
        assert!(a.allows(1000));
        assert!(!a.allows(1500));
    }
}
