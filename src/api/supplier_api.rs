// ==========================================
// Procurement Engine - supplier portal API
// ==========================================
// A supplier only ever sees orders of its own contracts.
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::OrderState;
use crate::engine::OrderLifecycleEngine;
use crate::perf::PerfGuard;
use crate::repository::{Criteria, UnitOfWorkFactory};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOrderView {
    pub order_id: i64,
    pub bid_code: String,
    pub scheduled_delivery: NaiveDate,
    pub state: OrderState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryStatus {
    pub folio: String,
    pub received_at: NaiveDateTime,
    pub order_state: OrderState,
}

pub struct SupplierApi {
    uow_factory: Arc<UnitOfWorkFactory>,
    lifecycle: OrderLifecycleEngine,
}

impl SupplierApi {
    pub fn new(uow_factory: Arc<UnitOfWorkFactory>) -> Self {
        Self {
            uow_factory,
            lifecycle: OrderLifecycleEngine::new(),
        }
    }

    /// APPROVED or INVOICE_LOADED orders still to be delivered by `supplier_id`.
    pub fn pending_orders(&self, supplier_id: i64) -> ApiResult<Vec<SupplierOrderView>> {
        let _perf = PerfGuard::new("supplier_api.pending_orders");
        self.uow_factory.read(|uow| {
            uow.suppliers().require(supplier_id)?;

            let contracts = uow
                .contracts()
                .find_by(&Criteria::new().eq("supplier_id", supplier_id))?;

            let mut views = Vec::new();
            for contract in contracts {
                let orders = uow
                    .purchase_orders()
                    .find_by(&Criteria::new().eq("contract_id", contract.id))?;
                views.extend(
                    orders
                        .into_iter()
                        .filter(|o| o.state.awaiting_delivery())
                        .map(|o| SupplierOrderView {
                            order_id: o.id,
                            bid_code: contract.bid_code.clone(),
                            scheduled_delivery: o.scheduled_delivery,
                            state: o.state,
                        }),
                );
            }
            views.sort_by_key(|v| (v.scheduled_delivery, v.order_id));
            Ok(views)
        })
    }

    pub fn load_invoice(&self, order_id: i64, supplier_id: i64, xml: &str) -> ApiResult<OrderState> {
        let _perf = PerfGuard::new("supplier_api.load_invoice");
        self.uow_factory.run(|uow| {
            Ok(self
                .lifecycle
                .load_invoice(uow, order_id, supplier_id, xml)?
                .state)
        })
    }

    /// Delivery status by folio; other suppliers' folios are refused.
    pub fn delivery_status(&self, folio: &str, supplier_id: i64) -> ApiResult<DeliveryStatus> {
        let _perf = PerfGuard::new("supplier_api.delivery_status");
        self.uow_factory.read(|uow| {
            let receipt = uow
                .warehouse_receipts()
                .find_by_folio(folio)?
                .ok_or_else(|| ApiError::NotFound(format!("WarehouseReceipt(folio={})", folio)))?;
            let order = uow.purchase_orders().require(receipt.purchase_order_id)?;
            let contract = uow.contracts().require(order.contract_id)?;

            if contract.supplier_id != supplier_id {
                tracing::warn!(folio, supplier_id, "folio lookup by foreign supplier refused");
                return Err(ApiError::PermissionDenied(format!(
                    "supplier {} cannot query folio {}",
                    supplier_id, folio
                )));
            }

            Ok(DeliveryStatus {
                folio: receipt.folio,
                received_at: receipt.received_at,
                order_state: order.state,
            })
        })
    }
}
