// ==========================================
// Procurement Engine - purchase orders and their follow-ups
// ==========================================
// PurchaseOrder 1:1 WarehouseReceipt 1:1 AccountingEntry
// Links are plain ids; every traversal is an explicit repository fetch
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::OrderState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: i64,
    pub contract_id: i64,
    pub scheduled_delivery: NaiveDate,
    pub state: OrderState,
}

/// Warehouse receipt (R.B.), created once when the goods arrive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseReceipt {
    pub id: i64,
    pub folio: String,                // RB-<YYYYMMDDHHMMSS>-<orderId>
    pub purchase_order_id: i64,
    pub received_at: NaiveDateTime,   // UTC
    pub invoice_path: Option<String>, // opaque, stored verbatim
    pub receiver_id: Option<i64>,
}

/// Government-accounting posting for one receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountingEntry {
    pub id: i64,
    pub warehouse_receipt_id: Option<i64>,
    pub ledger_line: String,
    pub accountant_id: Option<i64>,
    pub posted_at: NaiveDateTime, // UTC
}

/// Provisioning proposal: one DRAFT order per entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProposal {
    pub contract_id: i64,
    pub scheduled_delivery: NaiveDate,
}
