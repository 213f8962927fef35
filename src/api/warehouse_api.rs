// ==========================================
// Procurement Engine - warehouse API
// ==========================================
// Provisioning proposals, goods receipt, requirement dispatch, stock
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::contract_api::OrderView;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::{ContractItem, OrderProposal, WarehouseReceipt};
use crate::engine::{DispatchEngine, DispatchSummary, OrderLifecycleEngine};
use crate::perf::PerfGuard;
use crate::repository::UnitOfWorkFactory;

// ==========================================
// DTOs
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptPayload {
    pub order_id: i64,
    /// Opaque invoice file reference, stored verbatim
    pub invoice_path: Option<String>,
    pub receiver_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptView {
    pub id: i64,
    pub folio: String,
    pub purchase_order_id: i64,
    pub received_at: NaiveDateTime,
    pub invoice_path: Option<String>,
}

impl From<WarehouseReceipt> for ReceiptView {
    fn from(r: WarehouseReceipt) -> Self {
        Self {
            id: r.id,
            folio: r.folio,
            purchase_order_id: r.purchase_order_id,
            received_at: r.received_at,
            invoice_path: r.invoice_path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockStatus {
    pub item_id: i64,
    pub item_key: String,
    pub description: String,
    pub unit: String,
    pub max_quantity: i64,
    pub consumed_quantity: i64,
    pub available: i64,
}

impl From<ContractItem> for StockStatus {
    fn from(item: ContractItem) -> Self {
        Self {
            available: item.available(),
            item_id: item.id,
            item_key: item.item_key,
            description: item.description,
            unit: item.unit,
            max_quantity: item.max_quantity,
            consumed_quantity: item.consumed_quantity,
        }
    }
}

// ==========================================
// WarehouseApi
// ==========================================
pub struct WarehouseApi {
    uow_factory: Arc<UnitOfWorkFactory>,
    lifecycle: OrderLifecycleEngine,
    dispatcher: DispatchEngine,
}

impl WarehouseApi {
    pub fn new(uow_factory: Arc<UnitOfWorkFactory>) -> Self {
        Self {
            uow_factory,
            lifecycle: OrderLifecycleEngine::new(),
            dispatcher: DispatchEngine::new(),
        }
    }

    /// Create DRAFT orders; all or nothing.
    pub fn propose_orders(&self, proposals: &[OrderProposal]) -> ApiResult<Vec<OrderView>> {
        let _perf = PerfGuard::new("warehouse_api.propose_orders");
        if proposals.is_empty() {
            return Err(ApiError::InvalidInput("no order proposals given".to_string()));
        }

        self.uow_factory.run(|uow| {
            Ok(self
                .lifecycle
                .propose_orders(uow, proposals)?
                .into_iter()
                .map(OrderView::from)
                .collect())
        })
    }

    /// Receive goods now (UTC) for an APPROVED order.
    pub fn register_receipt(&self, payload: &ReceiptPayload) -> ApiResult<ReceiptView> {
        self.register_receipt_at(payload, Utc::now().naive_utc())
    }

    /// Same as `register_receipt` with an explicit UTC receipt time.
    pub fn register_receipt_at(
        &self,
        payload: &ReceiptPayload,
        received_at: NaiveDateTime,
    ) -> ApiResult<ReceiptView> {
        let _perf = PerfGuard::new("warehouse_api.register_receipt");
        self.uow_factory.run(|uow| {
            let receipt = self.lifecycle.receive_goods(
                uow,
                payload.order_id,
                payload.invoice_path.clone(),
                payload.receiver_id,
                received_at,
            )?;
            Ok(receipt.into())
        })
    }

    pub fn dispatch_requirement(&self, qr_id: &str) -> ApiResult<DispatchSummary> {
        let _perf = PerfGuard::new("warehouse_api.dispatch_requirement");
        let qr_id = qr_id.trim();
        if qr_id.is_empty() {
            return Err(ApiError::InvalidInput("QR id is required".to_string()));
        }
        self.uow_factory
            .run(|uow| Ok(self.dispatcher.dispatch(uow, qr_id)?))
    }

    pub fn stock_status(&self) -> ApiResult<Vec<StockStatus>> {
        let _perf = PerfGuard::new("warehouse_api.stock_status");
        self.uow_factory.read(|uow| {
            Ok(uow
                .contract_items()
                .list()?
                .into_iter()
                .map(StockStatus::from)
                .collect())
        })
    }
}
