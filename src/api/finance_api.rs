// ==========================================
// Procurement Engine - finance API
// ==========================================
// Receipt verification and government accounting sign-off
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::config::ProcurementConfigReader;
use crate::domain::{AccountingEntry, OrderState, WarehouseReceipt};
use crate::engine::{LedgerAccounts, OrderLifecycleEngine};
use crate::perf::PerfGuard;
use crate::repository::{UnitOfWork, UnitOfWorkFactory};

/// Receipt file waiting for verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptFileView {
    pub receipt_id: i64,
    pub folio: String,
    pub order_id: i64,
    pub received_at: NaiveDateTime,
    pub invoice_path: Option<String>,
    pub bid_code: String,
    pub supplier_tax_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountingEntryView {
    pub id: i64,
    pub receipt_id: Option<i64>,
    pub folio: Option<String>,
    pub ledger_line: String,
    pub posted_at: NaiveDateTime,
}

pub struct FinanceApi {
    uow_factory: Arc<UnitOfWorkFactory>,
    config: Arc<dyn ProcurementConfigReader>,
    lifecycle: OrderLifecycleEngine,
}

impl FinanceApi {
    pub fn new(uow_factory: Arc<UnitOfWorkFactory>, config: Arc<dyn ProcurementConfigReader>) -> Self {
        Self {
            uow_factory,
            config,
            lifecycle: OrderLifecycleEngine::new(),
        }
    }

    /// Receipts whose order is RECEIVED.
    pub fn pending_verification(&self) -> ApiResult<Vec<ReceiptFileView>> {
        let _perf = PerfGuard::new("finance_api.pending_verification");
        self.uow_factory.read(|uow| {
            let mut views = Vec::new();
            for order in uow.purchase_orders().find_by_state(OrderState::Received)? {
                if let Some(receipt) = uow.warehouse_receipts().find_by_order(order.id)? {
                    views.push(receipt_file_view(uow, receipt, order.contract_id)?);
                }
            }
            Ok(views)
        })
    }

    pub fn verify_receipt(&self, receipt_id: i64) -> ApiResult<OrderState> {
        let _perf = PerfGuard::new("finance_api.verify_receipt");
        self.uow_factory
            .run(|uow| Ok(self.lifecycle.verify(uow, receipt_id)?.state))
    }

    pub fn post_accounting_entry(
        &self,
        receipt_id: i64,
        accountant_id: Option<i64>,
    ) -> ApiResult<AccountingEntryView> {
        self.post_accounting_entry_at(receipt_id, accountant_id, Utc::now().naive_utc())
    }

    pub fn post_accounting_entry_at(
        &self,
        receipt_id: i64,
        accountant_id: Option<i64>,
        posted_at: NaiveDateTime,
    ) -> ApiResult<AccountingEntryView> {
        let _perf = PerfGuard::new("finance_api.post_accounting_entry");
        let accounts = LedgerAccounts {
            debit: self.config.ledger_debit_account()?,
            credit: self.config.ledger_credit_account()?,
        };

        self.uow_factory.run(|uow| {
            let entry = self.lifecycle.post_accounting_entry(
                uow,
                receipt_id,
                accountant_id,
                &accounts,
                posted_at,
            )?;
            entry_view(uow, entry)
        })
    }

    /// Entries whose order is VERIFIED, i.e. waiting for posting approval.
    pub fn pending_postings(&self) -> ApiResult<Vec<AccountingEntryView>> {
        let _perf = PerfGuard::new("finance_api.pending_postings");
        self.uow_factory.read(|uow| {
            let mut views = Vec::new();
            for order in uow.purchase_orders().find_by_state(OrderState::Verified)? {
                let Some(receipt) = uow.warehouse_receipts().find_by_order(order.id)? else {
                    continue;
                };
                if let Some(entry) = uow.accounting_entries().find_by_receipt(receipt.id)? {
                    views.push(entry_view(uow, entry)?);
                }
            }
            Ok(views)
        })
    }

    pub fn approve_posting(&self, entry_id: i64) -> ApiResult<OrderState> {
        let _perf = PerfGuard::new("finance_api.approve_posting");
        self.uow_factory
            .run(|uow| Ok(self.lifecycle.approve_posting(uow, entry_id)?.state))
    }
}

fn receipt_file_view(
    uow: &UnitOfWork,
    receipt: WarehouseReceipt,
    contract_id: i64,
) -> ApiResult<ReceiptFileView> {
    let contract = uow.contracts().require(contract_id)?;
    let supplier = uow.suppliers().require(contract.supplier_id)?;
    Ok(ReceiptFileView {
        receipt_id: receipt.id,
        folio: receipt.folio,
        order_id: receipt.purchase_order_id,
        received_at: receipt.received_at,
        invoice_path: receipt.invoice_path,
        bid_code: contract.bid_code,
        supplier_tax_id: supplier.tax_id,
    })
}

fn entry_view(uow: &UnitOfWork, entry: AccountingEntry) -> ApiResult<AccountingEntryView> {
    let folio = match entry.warehouse_receipt_id {
        Some(id) => uow.warehouse_receipts().get(id)?.map(|r| r.folio),
        None => None,
    };
    Ok(AccountingEntryView {
        id: entry.id,
        receipt_id: entry.warehouse_receipt_id,
        folio,
        ledger_line: entry.ledger_line,
        posted_at: entry.posted_at,
    })
}
