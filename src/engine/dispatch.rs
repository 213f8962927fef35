// ==========================================
// Procurement Engine - dispatch and stock accounting
// ==========================================
// dispatch(qr_id):
//   PENDING requirement -> month from qr_id -> per-row totals booked
//   into contract_item.consumed_quantity -> FULFILLED
// Missing items and cap overruns abort the whole dispatch.
// ==========================================

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

use crate::domain::{MonthlyProgramming, RequirementState};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::identifiers::parse_qr_month;
use crate::repository::UnitOfWork;

/// What one dispatch booked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchSummary {
    pub qr_id: String,
    pub month: NaiveDate,
    /// contract_item_id -> quantity added to consumed_quantity
    pub booked: BTreeMap<i64, i64>,
}

impl DispatchSummary {
    pub fn total(&self) -> i64 {
        self.booked.values().sum()
    }
}

#[derive(Debug, Default)]
pub struct DispatchEngine;

impl DispatchEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn dispatch(&self, uow: &UnitOfWork, qr_id: &str) -> EngineResult<DispatchSummary> {
        let mut requirement = uow
            .requirements()
            .find_by_qr_id(qr_id)?
            .ok_or_else(|| EngineError::not_found("ConsolidatedRequirement", qr_id))?;

        if requirement.state != RequirementState::Pending {
            warn!(qr_id, state = %requirement.state, "dispatch rejected");
            return Err(EngineError::invalid_state(
                "ConsolidatedRequirement",
                qr_id,
                RequirementState::Pending,
                requirement.state,
            ));
        }

        let month = parse_qr_month(qr_id)?;
        let rows = uow.monthly_programmings().find_by_month(month)?;
        if rows.is_empty() {
            warn!(qr_id, month = %month, "no programming for month, dispatching empty requirement");
        }

        let booked = book_consumption(uow, &rows)?;

        requirement.state = RequirementState::Fulfilled;
        uow.requirements().update(&requirement)?;

        let summary = DispatchSummary {
            qr_id: requirement.qr_id,
            month,
            booked,
        };
        info!(
            qr_id = %summary.qr_id,
            month = %month,
            items = summary.booked.len(),
            total = summary.total(),
            "requirement dispatched"
        );
        Ok(summary)
    }
}

fn book_consumption(
    uow: &UnitOfWork,
    rows: &[MonthlyProgramming],
) -> EngineResult<BTreeMap<i64, i64>> {
    let mut booked = BTreeMap::new();
    let items = uow.contract_items();

    for row in rows {
        let quantity = row.total();
        if quantity <= 0 {
            continue;
        }

        let mut item = items.get(row.contract_item_id)?.ok_or_else(|| {
            error!(
                programming_id = row.id,
                item_id = row.contract_item_id,
                "programming references missing contract item"
            );
            EngineError::DataIntegrity(format!(
                "monthly programming {} references missing contract item {}",
                row.id, row.contract_item_id
            ))
        })?;

        let consumed = item
            .consumed_quantity
            .checked_add(quantity)
            .filter(|&c| c <= item.max_quantity)
            .ok_or_else(|| {
                warn!(
                    item_id = item.id,
                    consumed = item.consumed_quantity,
                    quantity,
                    max = item.max_quantity,
                    "dispatch would exceed contract cap"
                );
                EngineError::Validation(format!(
                    "dispatching {} of item {} exceeds its cap ({} of {} consumed)",
                    quantity, item.item_key, item.consumed_quantity, item.max_quantity
                ))
            })?;

        item.consumed_quantity = consumed;
        items.update(&item)?;
        *booked.entry(item.id).or_insert(0) += quantity;
    }

    Ok(booked)
}
