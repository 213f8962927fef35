// ==========================================
// Procurement Engine - monthly programming and consolidation
// ==========================================

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::types::RequirementState;

/// day-of-month (1..=31) -> quantity
pub type DailyQuantities = BTreeMap<u32, i64>;

// ==========================================
// MonthlyProgramming
// ==========================================
// At most one row per (contract_item_id, month); month is always day 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProgramming {
    pub id: i64,
    pub user_id: Option<i64>,
    pub contract_item_id: i64,
    pub month: NaiveDate,
    pub daily_quantities: DailyQuantities,
}

impl MonthlyProgramming {
    /// Sum over all programmed days.
    pub fn total(&self) -> i64 {
        total_quantity(&self.daily_quantities)
    }
}

pub fn total_quantity(daily: &DailyQuantities) -> i64 {
    daily.values().sum()
}

/// Truncate a date to the first day of its month.
pub fn normalize_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

// ==========================================
// ConsolidatedRequirement
// ==========================================
// The target month only lives inside qr_id (REQ-YYYYMM-XXXXXXXX)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedRequirement {
    pub id: i64,
    pub qr_id: String,
    pub requested_by: Option<i64>,
    pub generated_at: NaiveDateTime,
    pub state: RequirementState,
}
