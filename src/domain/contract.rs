// ==========================================
// Procurement Engine - contracts and contract items
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Contract
// ==========================================
// Invariant: end_date >= start_date, bid_code unique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: i64,
    pub bid_code: String,
    pub file_path: Option<String>, // opaque attachment path, stored verbatim
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub supplier_id: i64,
}

impl Contract {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

// ==========================================
// ContractItem - one contract line with its cap
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractItem {
    pub id: i64,
    pub contract_id: i64,
    pub item_key: String,
    pub description: String,
    pub unit: String,
    pub unit_price: f64,
    pub max_quantity: i64,      // contract cap
    pub consumed_quantity: i64, // dispatched so far
    pub classification: Option<String>,
}

impl ContractItem {
    /// Cap minus what has already been dispatched.
    pub fn available(&self) -> i64 {
        self.max_quantity - self.consumed_quantity
    }
}

// ==========================================
// ContractItemInput - item line of a contract payload
// ==========================================
/// Item as supplied by callers or the catalog importer; no ids, nothing consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractItemInput {
    pub item_key: String,
    pub description: String,
    pub unit: String,
    pub unit_price: f64,
    pub max_quantity: i64,
    pub classification: Option<String>,
}

impl ContractItemInput {
    pub fn into_item(self, contract_id: i64) -> ContractItem {
        ContractItem {
            id: 0,
            contract_id,
            item_key: self.item_key,
            description: self.description,
            unit: self.unit,
            unit_price: self.unit_price,
            max_quantity: self.max_quantity,
            consumed_quantity: 0,
            classification: self.classification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_covers_inclusive_bounds() {
        let contract = Contract {
            id: 1,
            bid_code: "LPL 01-2025".to_string(),
            file_path: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            supplier_id: 1,
        };
        assert!(contract.covers(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(contract.covers(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
        assert!(!contract.covers(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }

    #[test]
    fn test_item_available() {
        let item = ContractItem {
            id: 1,
            contract_id: 1,
            item_key: "AB-001".to_string(),
            description: "Arroz".to_string(),
            unit: "kg".to_string(),
            unit_price: 22.5,
            max_quantity: 5000,
            consumed_quantity: 1200,
            classification: Some("GRANOS".to_string()),
        };
        assert_eq!(item.available(), 3800);
    }
}
