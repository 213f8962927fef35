// ==========================================
// Procurement Engine - late delivery penalty
// ==========================================
// Read-only: days_late = max(0, receipt date - scheduled date)
//            amount    = days_late * daily rate
// The rate is a configured flat value, not read from contract clauses.
// ==========================================

use chrono::NaiveDate;

use crate::domain::PenaltyBreakdown;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::UnitOfWork;

#[derive(Debug, Clone)]
pub struct PenaltyCalculator {
    daily_rate: f64,
}

impl PenaltyCalculator {
    pub fn new(daily_rate: f64) -> Self {
        Self { daily_rate }
    }

    pub fn daily_rate(&self) -> f64 {
        self.daily_rate
    }

    pub fn calculate_late_penalty(
        &self,
        uow: &UnitOfWork,
        order_id: i64,
    ) -> EngineResult<PenaltyBreakdown> {
        let order = uow.purchase_orders().require(order_id)?;
        let receipt = uow
            .warehouse_receipts()
            .find_by_order(order_id)?
            .ok_or_else(|| {
                EngineError::invalid_state("PurchaseOrder", order_id, "received", "not yet received")
            })?;

        let breakdown = self.breakdown(order_id, order.scheduled_delivery, receipt.received_at.date());
        tracing::debug!(
            order_id,
            days_late = breakdown.days_late,
            amount = breakdown.amount,
            "late penalty calculated"
        );
        Ok(breakdown)
    }

    /// Pure penalty math for a scheduled/actual date pair.
    pub fn breakdown(&self, order_id: i64, scheduled: NaiveDate, received: NaiveDate) -> PenaltyBreakdown {
        let days_late = (received - scheduled).num_days().max(0);
        if days_late == 0 {
            return PenaltyBreakdown {
                order_id,
                days_late: 0,
                amount: 0.0,
                detail: "delivered on time or early".to_string(),
            };
        }

        PenaltyBreakdown {
            order_id,
            days_late,
            amount: days_late as f64 * self.daily_rate,
            detail: format!("{} days late * ${:.2}/day", days_late, self.daily_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_five_days_late() {
        let p = PenaltyCalculator::new(150.0).breakdown(1, d(2025, 1, 10), d(2025, 1, 15));
        assert_eq!(p.days_late, 5);
        assert_eq!(p.amount, 750.0);
        assert_eq!(p.detail, "5 days late * $150.00/day");
    }

    #[test]
    fn test_on_time_and_early() {
        let calc = PenaltyCalculator::new(150.0);
        for received in [d(2025, 1, 10), d(2025, 1, 2)] {
            let p = calc.breakdown(1, d(2025, 1, 10), received);
            assert_eq!(p.days_late, 0);
            assert_eq!(p.amount, 0.0);
            assert_eq!(p.detail, "delivered on time or early");
        }
    }

    #[test]
    fn test_across_month_boundary() {
        let p = PenaltyCalculator::new(100.0).breakdown(9, d(2025, 1, 30), d(2025, 2, 2));
        assert_eq!(p.days_late, 3);
        assert_eq!(p.amount, 300.0);
    }
}
