// ==========================================
// Procurement Engine - order lifecycle engine
// ==========================================
// DRAFT -> APPROVED -> (INVOICE_LOADED) -> RECEIVED -> VERIFIED -> PAYMENT_PENDING
//
// Every operation works inside the caller's open UnitOfWork and never
// commits. A returned error leaves the scope for the caller to roll back.
// Cross-entity reads are explicit fetches by id.
// ==========================================

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::domain::{
    AccountingEntry, Contract, OrderProposal, OrderState, PurchaseOrder, Supplier,
    WarehouseReceipt,
};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::identifiers::{generate_folio, ledger_line};
use crate::repository::error::RepositoryError;
use crate::repository::UnitOfWork;

// ==========================================
// LedgerAccounts
// ==========================================
/// Debit/credit accounts written into every ledger line.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerAccounts {
    pub debit: String,
    pub credit: String,
}

impl Default for LedgerAccounts {
    fn default() -> Self {
        Self {
            debit: crate::config::config_manager::DEFAULT_LEDGER_DEBIT_ACCOUNT.to_string(),
            credit: crate::config::config_manager::DEFAULT_LEDGER_CREDIT_ACCOUNT.to_string(),
        }
    }
}

// ==========================================
// OrderLifecycleEngine
// ==========================================
/// Stateless; repositories come from the scope passed to each call.
#[derive(Debug, Default)]
pub struct OrderLifecycleEngine;

impl OrderLifecycleEngine {
    pub fn new() -> Self {
        Self
    }

    // ==========================================
    // DRAFT creation
    // ==========================================

    /// One DRAFT order per proposal. Any unresolved contract fails the whole batch.
    pub fn propose_orders(
        &self,
        uow: &UnitOfWork,
        proposals: &[OrderProposal],
    ) -> EngineResult<Vec<PurchaseOrder>> {
        let mut created = Vec::with_capacity(proposals.len());

        for proposal in proposals {
            uow.contracts().require(proposal.contract_id)?;

            let mut order = PurchaseOrder {
                id: 0,
                contract_id: proposal.contract_id,
                scheduled_delivery: proposal.scheduled_delivery,
                state: OrderState::Draft,
            };
            uow.purchase_orders().add(&mut order)?;
            created.push(order);
        }

        info!(count = created.len(), "draft purchase orders created");
        Ok(created)
    }

    // ==========================================
    // Administrative approval
    // ==========================================

    pub fn approve(&self, uow: &UnitOfWork, order_id: i64) -> EngineResult<PurchaseOrder> {
        let mut order = uow.purchase_orders().require(order_id)?;
        self.ensure_order_state(&order, OrderState::Draft)?;

        order.state = OrderState::Approved;
        uow.purchase_orders().update(&order)?;

        info!(order_id, "purchase order approved");
        Ok(order)
    }

    // ==========================================
    // Supplier invoice
    // ==========================================

    /// Checks run in order: ownership, state, XML shape.
    pub fn load_invoice(
        &self,
        uow: &UnitOfWork,
        order_id: i64,
        supplier_id: i64,
        xml: &str,
    ) -> EngineResult<PurchaseOrder> {
        let mut order = uow.purchase_orders().require(order_id)?;
        let contract = self.contract_of(uow, &order)?;

        if contract.supplier_id != supplier_id {
            warn!(order_id, supplier_id, "invoice rejected: supplier does not own order");
            return Err(EngineError::PermissionDenied(format!(
                "supplier {} has no access to purchase order {}",
                supplier_id, order_id
            )));
        }

        self.ensure_order_state(&order, OrderState::Approved)?;

        if !is_well_formed_xml(xml) {
            return Err(EngineError::Validation(
                "invoice XML must start with '<' and end with '>'".to_string(),
            ));
        }

        order.state = OrderState::InvoiceLoaded;
        uow.purchase_orders().update(&order)?;

        info!(order_id, supplier_id, "invoice loaded");
        Ok(order)
    }

    // ==========================================
    // Warehouse receipt
    // ==========================================

    /// Receive goods for an APPROVED order and issue its folio.
    ///
    /// `received_at` is the UTC receipt time; it is also embedded in the folio.
    pub fn receive_goods(
        &self,
        uow: &UnitOfWork,
        order_id: i64,
        invoice_path: Option<String>,
        receiver_id: Option<i64>,
        received_at: NaiveDateTime,
    ) -> EngineResult<WarehouseReceipt> {
        let mut order = uow.purchase_orders().require(order_id)?;
        self.ensure_order_state(&order, OrderState::Approved)?;

        let mut receipt = WarehouseReceipt {
            id: 0,
            folio: generate_folio(received_at, order.id),
            purchase_order_id: order.id,
            received_at,
            invoice_path,
            receiver_id,
        };
        uow.warehouse_receipts()
            .add(&mut receipt)
            .map_err(|e| duplicate_on_unique(e, format!("purchase order {} already received", order_id)))?;

        order.state = OrderState::Received;
        uow.purchase_orders().update(&order)?;

        info!(order_id, folio = %receipt.folio, "goods received");
        Ok(receipt)
    }

    // ==========================================
    // Finance
    // ==========================================

    pub fn verify(&self, uow: &UnitOfWork, receipt_id: i64) -> EngineResult<PurchaseOrder> {
        let receipt = uow.warehouse_receipts().require(receipt_id)?;
        let mut order = uow.purchase_orders().require(receipt.purchase_order_id)?;
        self.ensure_order_state(&order, OrderState::Received)?;

        order.state = OrderState::Verified;
        uow.purchase_orders().update(&order)?;

        info!(receipt_id, order_id = order.id, "receipt file verified");
        Ok(order)
    }

    /// Create the single accounting entry for a verified receipt.
    pub fn post_accounting_entry(
        &self,
        uow: &UnitOfWork,
        receipt_id: i64,
        accountant_id: Option<i64>,
        accounts: &LedgerAccounts,
        posted_at: NaiveDateTime,
    ) -> EngineResult<AccountingEntry> {
        let receipt = uow.warehouse_receipts().require(receipt_id)?;
        let order = uow.purchase_orders().require(receipt.purchase_order_id)?;
        self.ensure_order_state(&order, OrderState::Verified)?;

        if let Some(existing) = uow.accounting_entries().find_by_receipt(receipt_id)? {
            warn!(receipt_id, entry_id = existing.id, "accounting entry already posted");
            return Err(EngineError::DuplicateEntry(format!(
                "receipt {} already has accounting entry {}",
                receipt_id, existing.id
            )));
        }

        let contract = self.contract_of(uow, &order)?;
        let supplier = self.supplier_of(uow, &contract)?;

        let mut entry = AccountingEntry {
            id: 0,
            warehouse_receipt_id: Some(receipt.id),
            ledger_line: ledger_line(
                posted_at,
                &receipt.folio,
                &supplier.tax_id,
                &accounts.debit,
                &accounts.credit,
            ),
            accountant_id,
            posted_at,
        };
        uow.accounting_entries()
            .add(&mut entry)
            .map_err(|e| duplicate_on_unique(e, format!("receipt {} already posted", receipt_id)))?;

        info!(receipt_id, entry_id = entry.id, folio = %receipt.folio, "accounting entry posted");
        Ok(entry)
    }

    /// Release the order for payment.
    pub fn approve_posting(&self, uow: &UnitOfWork, entry_id: i64) -> EngineResult<PurchaseOrder> {
        let entry = uow.accounting_entries().require(entry_id)?;
        let receipt_id = entry.warehouse_receipt_id.ok_or_else(|| {
            EngineError::DataIntegrity(format!(
                "accounting entry {} is not linked to a warehouse receipt",
                entry_id
            ))
        })?;
        let receipt = uow.warehouse_receipts().require(receipt_id)?;
        let mut order = uow.purchase_orders().require(receipt.purchase_order_id)?;
        self.ensure_order_state(&order, OrderState::Verified)?;

        order.state = OrderState::PaymentPending;
        uow.purchase_orders().update(&order)?;

        info!(entry_id, order_id = order.id, "posting approved, payment pending");
        Ok(order)
    }

    // ==========================================
    // Helpers
    // ==========================================

    fn ensure_order_state(&self, order: &PurchaseOrder, expected: OrderState) -> EngineResult<()> {
        if order.state == expected {
            return Ok(());
        }
        warn!(
            order_id = order.id,
            expected = %expected,
            actual = %order.state,
            "transition rejected"
        );
        Err(EngineError::invalid_state(
            "PurchaseOrder",
            order.id,
            expected,
            order.state,
        ))
    }

    fn contract_of(&self, uow: &UnitOfWork, order: &PurchaseOrder) -> EngineResult<Contract> {
        uow.contracts().get(order.contract_id)?.ok_or_else(|| {
            EngineError::DataIntegrity(format!(
                "purchase order {} references missing contract {}",
                order.id, order.contract_id
            ))
        })
    }

    fn supplier_of(&self, uow: &UnitOfWork, contract: &Contract) -> EngineResult<Supplier> {
        uow.suppliers().get(contract.supplier_id)?.ok_or_else(|| {
            EngineError::DataIntegrity(format!(
                "contract {} references missing supplier {}",
                contract.id, contract.supplier_id
            ))
        })
    }
}

/// Outer angle-bracket check only; schema validation happens elsewhere.
pub fn is_well_formed_xml(xml: &str) -> bool {
    let trimmed = xml.trim();
    trimmed.starts_with('<') && trimmed.ends_with('>')
}

fn duplicate_on_unique(err: RepositoryError, message: String) -> EngineError {
    match err {
        RepositoryError::UniqueConstraintViolation(_) => EngineError::DuplicateEntry(message),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, open_sqlite_connection};
    use crate::domain::{ContractItem, Supplier};
    use crate::repository::UnitOfWorkFactory;
    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    fn setup() -> (NamedTempFile, UnitOfWorkFactory, i64, i64) {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        init_schema(&open_sqlite_connection(&path).unwrap()).unwrap();
        let factory = UnitOfWorkFactory::new(path);

        let uow = factory.open().unwrap();
        let mut supplier = Supplier {
            id: 0,
            legal_name: "Distribuidora del Valle".to_string(),
            tax_id: "DVS880101ABC".to_string(),
            contact_email: None,
        };
        uow.suppliers().add(&mut supplier).unwrap();
        let mut contract = Contract {
            id: 0,
            bid_code: "LPL 01-2025".to_string(),
            file_path: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            supplier_id: supplier.id,
        };
        uow.contracts().add(&mut contract).unwrap();
        let mut item = ContractItem {
            id: 0,
            contract_id: contract.id,
            item_key: "AB-001".to_string(),
            description: "Arroz".to_string(),
            unit: "kg".to_string(),
            unit_price: 22.5,
            max_quantity: 5000,
            consumed_quantity: 0,
            classification: None,
        };
        uow.contract_items().add(&mut item).unwrap();
        uow.commit().unwrap();

        (file, factory, supplier.id, contract.id)
    }

    fn draft(uow: &UnitOfWork, contract_id: i64) -> PurchaseOrder {
        let engine = OrderLifecycleEngine::new();
        let mut orders = engine
            .propose_orders(
                uow,
                &[OrderProposal {
                    contract_id,
                    scheduled_delivery: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
                }],
            )
            .unwrap();
        orders.remove(0)
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_propose_orders_unknown_contract() {
        let (_file, factory, _, _) = setup();
        let uow = factory.open().unwrap();
        let err = OrderLifecycleEngine::new()
            .propose_orders(
                &uow,
                &[OrderProposal {
                    contract_id: 999,
                    scheduled_delivery: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
                }],
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[test]
    fn test_approve_only_from_draft() {
        let (_file, factory, _, contract_id) = setup();
        let uow = factory.open().unwrap();
        let engine = OrderLifecycleEngine::new();
        let order = draft(&uow, contract_id);

        let approved = engine.approve(&uow, order.id).unwrap();
        assert_eq!(approved.state, OrderState::Approved);

        let err = engine.approve(&uow, order.id).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState { .. }));

        let err = engine.approve(&uow, 12345).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[test]
    fn test_load_invoice_checks() {
        let (_file, factory, supplier_id, contract_id) = setup();
        let uow = factory.open().unwrap();
        let engine = OrderLifecycleEngine::new();
        let order = draft(&uow, contract_id);

        // wrong supplier wins over wrong state
        let err = engine.load_invoice(&uow, order.id, supplier_id + 1, "<x/>").unwrap_err();
        assert!(matches!(err, EngineError::PermissionDenied(_)));

        let err = engine.load_invoice(&uow, order.id, supplier_id, "<x/>").unwrap_err();
        assert!(matches!(err, EngineError::InvalidState { .. }));

        engine.approve(&uow, order.id).unwrap();
        let err = engine
            .load_invoice(&uow, order.id, supplier_id, "not xml")
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let loaded = engine
            .load_invoice(&uow, order.id, supplier_id, "  <cfdi:Comprobante/>\n")
            .unwrap();
        assert_eq!(loaded.state, OrderState::InvoiceLoaded);

        // receiving requires APPROVED, not INVOICE_LOADED
        let err = engine
            .receive_goods(&uow, order.id, None, None, now())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidState { .. }));
    }

    #[test]
    fn test_receive_verify_post_approve() {
        let (_file, factory, _, contract_id) = setup();
        let uow = factory.open().unwrap();
        let engine = OrderLifecycleEngine::new();
        let order = draft(&uow, contract_id);
        engine.approve(&uow, order.id).unwrap();

        let receipt = engine
            .receive_goods(&uow, order.id, Some("facturas/1.xml".to_string()), None, now())
            .unwrap();
        assert_eq!(receipt.folio, format!("RB-20250115103000-{}", order.id));
        assert_eq!(
            uow.purchase_orders().require(order.id).unwrap().state,
            OrderState::Received
        );

        let err = engine
            .post_accounting_entry(&uow, receipt.id, None, &LedgerAccounts::default(), now())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidState { .. }));

        engine.verify(&uow, receipt.id).unwrap();
        let entry = engine
            .post_accounting_entry(&uow, receipt.id, None, &LedgerAccounts::default(), now())
            .unwrap();
        assert!(entry.ledger_line.contains(&receipt.folio));
        assert!(entry.ledger_line.ends_with("/DVS880101ABC"));

        let err = engine
            .post_accounting_entry(&uow, receipt.id, None, &LedgerAccounts::default(), now())
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateEntry(_)));

        let paid = engine.approve_posting(&uow, entry.id).unwrap();
        assert_eq!(paid.state, OrderState::PaymentPending);

        let err = engine.approve_posting(&uow, entry.id).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState { .. }));
    }

    #[test]
    fn test_xml_shape() {
        assert!(is_well_formed_xml("<a></a>"));
        assert!(is_well_formed_xml("\n <a/> \t"));
        assert!(!is_well_formed_xml(""));
        assert!(!is_well_formed_xml("<a"));
    }
}
