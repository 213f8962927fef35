// ==========================================
// Procurement Engine - domain state types
// ==========================================
// Stored as SCREAMING_SNAKE_CASE strings, same as the serde form
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Purchase order state
// ==========================================
// DRAFT -> APPROVED -> (INVOICE_LOADED) / RECEIVED -> VERIFIED -> PAYMENT_PENDING
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    Draft,          // created from a provisioning proposal
    Approved,       // approved by the administrative area
    InvoiceLoaded,  // supplier uploaded the invoice XML
    Received,       // goods received at the warehouse
    Verified,       // receipt file verified by finance
    PaymentPending, // accounting entry approved, invoice released for payment
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl OrderState {
    /// Parse the stored form; `None` for anything unknown.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "DRAFT" => Some(OrderState::Draft),
            "APPROVED" => Some(OrderState::Approved),
            "INVOICE_LOADED" => Some(OrderState::InvoiceLoaded),
            "RECEIVED" => Some(OrderState::Received),
            "VERIFIED" => Some(OrderState::Verified),
            "PAYMENT_PENDING" => Some(OrderState::PaymentPending),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            OrderState::Draft => "DRAFT",
            OrderState::Approved => "APPROVED",
            OrderState::InvoiceLoaded => "INVOICE_LOADED",
            OrderState::Received => "RECEIVED",
            OrderState::Verified => "VERIFIED",
            OrderState::PaymentPending => "PAYMENT_PENDING",
        }
    }

    /// PAYMENT_PENDING is the last state this system manages.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::PaymentPending)
    }

    /// States in which the supplier still owes a delivery.
    pub fn awaiting_delivery(&self) -> bool {
        matches!(self, OrderState::Approved | OrderState::InvoiceLoaded)
    }
}

// ==========================================
// Consolidated requirement state
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequirementState {
    Pending,   // generated, waiting for warehouse dispatch
    Fulfilled, // dispatched, consumed quantities already booked
}

impl fmt::Display for RequirementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl RequirementState {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Some(RequirementState::Pending),
            "FULFILLED" => Some(RequirementState::Fulfilled),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            RequirementState::Pending => "PENDING",
            RequirementState::Fulfilled => "FULFILLED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_state_db_roundtrip() {
        for state in [
            OrderState::Draft,
            OrderState::Approved,
            OrderState::InvoiceLoaded,
            OrderState::Received,
            OrderState::Verified,
            OrderState::PaymentPending,
        ] {
            assert_eq!(OrderState::from_str(state.to_db_str()), Some(state));
        }
        assert_eq!(OrderState::from_str("approved"), Some(OrderState::Approved));
        assert_eq!(OrderState::from_str("BORRADOR"), None);
    }

    #[test]
    fn test_order_state_serde_matches_db_form() {
        let json = serde_json::to_string(&OrderState::InvoiceLoaded).unwrap();
        assert_eq!(json, "\"INVOICE_LOADED\"");
        assert_eq!(OrderState::PaymentPending.to_string(), "PAYMENT_PENDING");
    }

    #[test]
    fn test_awaiting_delivery() {
        assert!(OrderState::Approved.awaiting_delivery());
        assert!(OrderState::InvoiceLoaded.awaiting_delivery());
        assert!(!OrderState::Draft.awaiting_delivery());
        assert!(!OrderState::Received.awaiting_delivery());
    }

    #[test]
    fn test_requirement_state_parse() {
        assert_eq!(RequirementState::from_str("PENDING"), Some(RequirementState::Pending));
        assert_eq!(RequirementState::from_str("FULFILLED"), Some(RequirementState::Fulfilled));
        assert_eq!(RequirementState::from_str("PREVIA"), None);
    }
}
