// ==========================================
// Procurement Engine - administrative API
// ==========================================
// Contracts, suppliers, order approval, catalog import
// One unit-of-work scope per call
// ==========================================

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{Contract, ContractItem, ContractItemInput, OrderState, PurchaseOrder, Supplier};
use crate::engine::OrderLifecycleEngine;
use crate::importer::CatalogImporter;
use crate::perf::PerfGuard;
use crate::repository::{Criteria, UnitOfWork, UnitOfWorkFactory};

// ==========================================
// DTOs
// ==========================================

/// Create (id = None) or update payload for a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractPayload {
    pub id: Option<i64>,
    pub bid_code: String,
    pub file_path: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub supplier_id: i64,
    pub items: Vec<ContractItemInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSummary {
    pub id: i64,
    pub bid_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub supplier_id: i64,
    pub supplier_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDetail {
    pub contract: Contract,
    pub supplier_name: String,
    pub items: Vec<ContractItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierPayload {
    pub legal_name: String,
    pub tax_id: String,
    pub contact_email: Option<String>,
}

/// Order row for approval queues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: i64,
    pub contract_id: i64,
    pub scheduled_delivery: NaiveDate,
    pub state: OrderState,
}

impl From<PurchaseOrder> for OrderView {
    fn from(order: PurchaseOrder) -> Self {
        Self {
            id: order.id,
            contract_id: order.contract_id,
            scheduled_delivery: order.scheduled_delivery,
            state: order.state,
        }
    }
}

// ==========================================
// ContractApi
// ==========================================
pub struct ContractApi {
    uow_factory: Arc<UnitOfWorkFactory>,
    lifecycle: OrderLifecycleEngine,
    importer: CatalogImporter,
}

impl ContractApi {
    pub fn new(uow_factory: Arc<UnitOfWorkFactory>) -> Self {
        Self {
            uow_factory,
            lifecycle: OrderLifecycleEngine::new(),
            importer: CatalogImporter::new(),
        }
    }

    // ===== Contracts =====

    /// Create or update a contract with its item list.
    ///
    /// On update, items are matched by `item_key`: matches keep their
    /// consumed quantity, missing keys are deleted, new keys are inserted.
    pub fn save_contract(&self, payload: ContractPayload) -> ApiResult<ContractDetail> {
        let _perf = PerfGuard::new("contract_api.save_contract");
        validate_contract_payload(&payload)?;

        self.uow_factory.run(|uow| {
            let supplier = uow.suppliers().get(payload.supplier_id)?.ok_or_else(|| {
                ApiError::NotFound(format!("Supplier(id={})", payload.supplier_id))
            })?;

            if let Some(other) = uow
                .contracts()
                .find_one_by(&Criteria::new().eq("bid_code", payload.bid_code.clone()))?
            {
                if Some(other.id) != payload.id {
                    return Err(ApiError::DuplicateEntry(format!(
                        "bid code '{}' already used by contract {}",
                        payload.bid_code, other.id
                    )));
                }
            }

            let contract = match payload.id {
                Some(id) => {
                    let mut contract = uow.contracts().require(id)?;
                    contract.bid_code = payload.bid_code.clone();
                    contract.file_path = payload.file_path.clone();
                    contract.start_date = payload.start_date;
                    contract.end_date = payload.end_date;
                    contract.supplier_id = payload.supplier_id;
                    uow.contracts().update(&contract)?;
                    contract
                }
                None => {
                    let mut contract = Contract {
                        id: 0,
                        bid_code: payload.bid_code.clone(),
                        file_path: payload.file_path.clone(),
                        start_date: payload.start_date,
                        end_date: payload.end_date,
                        supplier_id: payload.supplier_id,
                    };
                    uow.contracts().add(&mut contract)?;
                    contract
                }
            };

            let items = replace_items(uow, contract.id, payload.items.clone())?;

            info!(
                contract_id = contract.id,
                bid_code = %contract.bid_code,
                items = items.len(),
                "contract saved"
            );
            Ok(ContractDetail {
                contract,
                supplier_name: supplier.legal_name,
                items,
            })
        })
    }

    pub fn list_contracts(&self) -> ApiResult<Vec<ContractSummary>> {
        let _perf = PerfGuard::new("contract_api.list_contracts");
        self.uow_factory.read(|uow| {
            let names: HashMap<i64, String> = uow
                .suppliers()
                .list()?
                .into_iter()
                .map(|s| (s.id, s.legal_name))
                .collect();

            Ok(uow
                .contracts()
                .list()?
                .into_iter()
                .map(|c| ContractSummary {
                    supplier_name: names.get(&c.supplier_id).cloned().unwrap_or_default(),
                    id: c.id,
                    bid_code: c.bid_code,
                    start_date: c.start_date,
                    end_date: c.end_date,
                    supplier_id: c.supplier_id,
                })
                .collect())
        })
    }

    pub fn get_contract(&self, contract_id: i64) -> ApiResult<Option<ContractDetail>> {
        let _perf = PerfGuard::new("contract_api.get_contract");
        self.uow_factory.read(|uow| {
            let contract = match uow.contracts().get(contract_id)? {
                Some(c) => c,
                None => return Ok(None),
            };
            let supplier_name = uow
                .suppliers()
                .get(contract.supplier_id)?
                .map(|s| s.legal_name)
                .unwrap_or_default();
            let items = uow
                .contract_items()
                .find_by(&Criteria::new().eq("contract_id", contract.id))?;

            Ok(Some(ContractDetail {
                contract,
                supplier_name,
                items,
            }))
        })
    }

    // ===== Suppliers =====

    pub fn list_suppliers(&self) -> ApiResult<Vec<Supplier>> {
        let _perf = PerfGuard::new("contract_api.list_suppliers");
        self.uow_factory.read(|uow| Ok(uow.suppliers().list()?))
    }

    pub fn register_supplier(&self, payload: SupplierPayload) -> ApiResult<Supplier> {
        let _perf = PerfGuard::new("contract_api.register_supplier");
        let legal_name = payload.legal_name.trim().to_string();
        let tax_id = payload.tax_id.trim().to_uppercase();
        if legal_name.is_empty() || tax_id.is_empty() {
            return Err(ApiError::InvalidInput(
                "supplier legal name and tax id are required".to_string(),
            ));
        }

        self.uow_factory.run(|uow| {
            if uow
                .suppliers()
                .find_one_by(&Criteria::new().eq("tax_id", tax_id.clone()))?
                .is_some()
            {
                return Err(ApiError::DuplicateEntry(format!(
                    "supplier with tax id {} already registered",
                    tax_id
                )));
            }

            let mut supplier = Supplier {
                id: 0,
                legal_name: legal_name.clone(),
                tax_id: tax_id.clone(),
                contact_email: payload.contact_email.clone(),
            };
            uow.suppliers().add(&mut supplier)?;
            info!(supplier_id = supplier.id, tax_id = %supplier.tax_id, "supplier registered");
            Ok(supplier)
        })
    }

    // ===== Order approval =====

    pub fn list_orders_pending_approval(&self) -> ApiResult<Vec<OrderView>> {
        let _perf = PerfGuard::new("contract_api.list_orders_pending_approval");
        self.uow_factory.read(|uow| {
            Ok(uow
                .purchase_orders()
                .find_by_state(OrderState::Draft)?
                .into_iter()
                .map(OrderView::from)
                .collect())
        })
    }

    pub fn approve_order(&self, order_id: i64) -> ApiResult<OrderView> {
        let _perf = PerfGuard::new("contract_api.approve_order");
        self.uow_factory
            .run(|uow| Ok(self.lifecycle.approve(uow, order_id)?.into()))
    }

    // ===== Catalog import =====

    /// Parse a CSV/Excel catalog into item inputs for `save_contract`.
    pub fn import_catalog<P: AsRef<Path>>(&self, path: P) -> ApiResult<Vec<ContractItemInput>> {
        let _perf = PerfGuard::new("contract_api.import_catalog");
        Ok(self.importer.import_file(path)?)
    }
}

fn validate_contract_payload(payload: &ContractPayload) -> ApiResult<()> {
    if payload.bid_code.trim().is_empty() {
        return Err(ApiError::InvalidInput("bid code is required".to_string()));
    }
    if payload.end_date < payload.start_date {
        return Err(ApiError::ValidationError(format!(
            "contract end date {} is before start date {}",
            payload.end_date, payload.start_date
        )));
    }

    let mut keys = std::collections::HashSet::new();
    for item in &payload.items {
        if item.item_key.trim().is_empty() {
            return Err(ApiError::InvalidInput("item key is required".to_string()));
        }
        if !keys.insert(item.item_key.as_str()) {
            return Err(ApiError::ValidationError(format!(
                "item key '{}' appears twice",
                item.item_key
            )));
        }
        if item.max_quantity < 0 || !item.unit_price.is_finite() || item.unit_price < 0.0 {
            return Err(ApiError::ValidationError(format!(
                "item '{}' needs a non-negative price and max quantity",
                item.item_key
            )));
        }
    }
    Ok(())
}

fn replace_items(
    uow: &UnitOfWork,
    contract_id: i64,
    inputs: Vec<ContractItemInput>,
) -> ApiResult<Vec<ContractItem>> {
    let repo = uow.contract_items();
    let mut existing: HashMap<String, ContractItem> = repo
        .find_by(&Criteria::new().eq("contract_id", contract_id))?
        .into_iter()
        .map(|item| (item.item_key.clone(), item))
        .collect();

    let mut saved = Vec::with_capacity(inputs.len());
    for input in inputs {
        match existing.remove(&input.item_key) {
            Some(mut item) => {
                if input.max_quantity < item.consumed_quantity {
                    return Err(ApiError::BusinessRuleViolation(format!(
                        "item '{}' already consumed {}, cap cannot drop to {}",
                        item.item_key, item.consumed_quantity, input.max_quantity
                    )));
                }
                item.description = input.description;
                item.unit = input.unit;
                item.unit_price = input.unit_price;
                item.max_quantity = input.max_quantity;
                item.classification = input.classification;
                repo.update(&item)?;
                saved.push(item);
            }
            None => {
                let mut item = input.into_item(contract_id);
                repo.add(&mut item)?;
                saved.push(item);
            }
        }
    }

    for stale in existing.into_values() {
        repo.delete_by(&Criteria::new().eq("id", stale.id))?;
    }

    Ok(saved)
}
