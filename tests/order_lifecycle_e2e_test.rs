// ==========================================
// Purchase order lifecycle, end to end
// ==========================================
// DRAFT -> APPROVED -> RECEIVED -> VERIFIED -> PAYMENT_PENDING
// through the actor APIs, one unit of work per call
// ==========================================


mod helpers;

#[cfg(test)]
mod order_lifecycle_e2e_test {
    use std::sync::Arc;

    use procurement_engine::api::{ApiError, FinanceApi, LegalApi, ReceiptPayload};
    use procurement_engine::domain::{OrderProposal, OrderState};
    use regex::Regex;

    use crate::helpers::mock_config::MockConfig;
    use crate::test_helpers::{d, dt, setup_env, TestEnv};

    fn propose_one(env: &TestEnv, scheduled: chrono::NaiveDate) -> i64 {
        let orders = env
            .state
            .warehouse_api
            .propose_orders(&[OrderProposal {
                contract_id: env.contract_id,
                scheduled_delivery: scheduled,
            }])
            .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].state, OrderState::Draft);
        orders[0].id
    }

    fn receipt(order_id: i64) -> ReceiptPayload {
        ReceiptPayload {
            order_id,
            invoice_path: Some("/facturas/F-001.xml".to_string()),
            receiver_id: None,
        }
    }

    #[test]
    fn test_full_lifecycle() {
        let env = setup_env();
        let state = &env.state;

        let order_id = propose_one(&env, d(2025, 1, 10));
        let pending = state.contract_api.list_orders_pending_approval().unwrap();
        assert_eq!(pending.iter().map(|o| o.id).collect::<Vec<_>>(), vec![order_id]);

        let approved = state.contract_api.approve_order(order_id).unwrap();
        assert_eq!(approved.state, OrderState::Approved);
        assert!(state.contract_api.list_orders_pending_approval().unwrap().is_empty());

        let view = state
            .warehouse_api
            .register_receipt_at(&receipt(order_id), dt(2025, 1, 15, 10, 30, 0))
            .unwrap();
        assert_eq!(view.folio, format!("RB-20250115103000-{}", order_id));

        let queue = state.finance_api.pending_verification().unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].receipt_id, view.id);
        assert_eq!(queue[0].bid_code, "LPL 01-2025");
        assert_eq!(queue[0].supplier_tax_id, "DVS880101ABC");

        assert_eq!(
            state.finance_api.verify_receipt(view.id).unwrap(),
            OrderState::Verified
        );
        assert!(state.finance_api.pending_verification().unwrap().is_empty());

        let entry = state
            .finance_api
            .post_accounting_entry_at(view.id, None, dt(2025, 1, 20, 9, 0, 0))
            .unwrap();
        assert_eq!(
            entry.ledger_line,
            format!(
                "POLIZA-DEVENGO-2025-CARGO:6151-Inventario/{};ABONO:2112-Cuentas por Pagar a Corto Plazo/DVS880101ABC",
                view.folio
            )
        );
        assert_eq!(entry.folio.as_deref(), Some(view.folio.as_str()));

        let postings = state.finance_api.pending_postings().unwrap();
        assert_eq!(postings.len(), 1);

        assert_eq!(
            state.finance_api.approve_posting(entry.id).unwrap(),
            OrderState::PaymentPending
        );
        assert!(state.finance_api.pending_postings().unwrap().is_empty());
    }

    #[test]
    fn test_folio_format() {
        let env = setup_env();
        let order_id = propose_one(&env, d(2025, 2, 1));
        env.state.contract_api.approve_order(order_id).unwrap();

        let view = env.state.warehouse_api.register_receipt(&receipt(order_id)).unwrap();
        let re = Regex::new(r"^RB-\d{14}-(\d+)$").unwrap();
        let caps = re.captures(&view.folio).unwrap();
        assert_eq!(caps[1].parse::<i64>().unwrap(), order_id);
    }

    #[test]
    fn test_out_of_order_transitions_rejected() {
        let env = setup_env();
        let state = &env.state;
        let order_id = propose_one(&env, d(2025, 1, 10));

        // Receiving a DRAFT order
        let err = state
            .warehouse_api
            .register_receipt_at(&receipt(order_id), dt(2025, 1, 10, 8, 0, 0))
            .unwrap_err();
        match err {
            ApiError::InvalidStateTransition { expected, actual, .. } => {
                assert_eq!(expected, "APPROVED");
                assert_eq!(actual, "DRAFT");
            }
            other => panic!("expected InvalidStateTransition, got {:?}", other),
        }

        state.contract_api.approve_order(order_id).unwrap();
        let err = state.contract_api.approve_order(order_id).unwrap_err();
        assert!(matches!(err, ApiError::InvalidStateTransition { .. }));

        let view = state
            .warehouse_api
            .register_receipt_at(&receipt(order_id), dt(2025, 1, 10, 8, 0, 0))
            .unwrap();

        // Posting before verification
        let err = state
            .finance_api
            .post_accounting_entry_at(view.id, None, dt(2025, 1, 11, 8, 0, 0))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidStateTransition { .. }));

        state.finance_api.verify_receipt(view.id).unwrap();
        let err = state.finance_api.verify_receipt(view.id).unwrap_err();
        assert!(matches!(err, ApiError::InvalidStateTransition { .. }));

        let entry = state
            .finance_api
            .post_accounting_entry_at(view.id, None, dt(2025, 1, 11, 8, 0, 0))
            .unwrap();
        let err = state
            .finance_api
            .post_accounting_entry_at(view.id, None, dt(2025, 1, 11, 9, 0, 0))
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateEntry(_)));

        state.finance_api.approve_posting(entry.id).unwrap();
        let err = state.finance_api.approve_posting(entry.id).unwrap_err();
        assert!(matches!(err, ApiError::InvalidStateTransition { .. }));
    }

    #[test]
    fn test_propose_orders_is_all_or_nothing() {
        let env = setup_env();
        let err = env
            .state
            .warehouse_api
            .propose_orders(&[
                OrderProposal {
                    contract_id: env.contract_id,
                    scheduled_delivery: d(2025, 3, 1),
                },
                OrderProposal {
                    contract_id: 9999,
                    scheduled_delivery: d(2025, 3, 1),
                },
            ])
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(env
            .state
            .contract_api
            .list_orders_pending_approval()
            .unwrap()
            .is_empty());

        let err = env.state.warehouse_api.propose_orders(&[]).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_supplier_portal_permissions() {
        let env = setup_env();
        let state = &env.state;
        let order_id = propose_one(&env, d(2025, 1, 10));

        // Invoice on a DRAFT order: ownership is checked before state
        let err = state
            .supplier_api
            .load_invoice(order_id, env.other_supplier_id, "<cfdi/>")
            .unwrap_err();
        assert!(matches!(err, ApiError::PermissionDenied(_)));

        let err = state
            .supplier_api
            .load_invoice(order_id, env.supplier_id, "<cfdi/>")
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidStateTransition { .. }));

        state.contract_api.approve_order(order_id).unwrap();

        let mine = state.supplier_api.pending_orders(env.supplier_id).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].bid_code, "LPL 01-2025");
        assert!(state
            .supplier_api
            .pending_orders(env.other_supplier_id)
            .unwrap()
            .is_empty());

        let err = state
            .supplier_api
            .load_invoice(order_id, env.supplier_id, "factura")
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));

        assert_eq!(
            state
                .supplier_api
                .load_invoice(order_id, env.supplier_id, "<cfdi:Comprobante/>")
                .unwrap(),
            OrderState::InvoiceLoaded
        );
        // Still awaiting delivery from the supplier's point of view
        assert_eq!(state.supplier_api.pending_orders(env.supplier_id).unwrap().len(), 1);
    }

    #[test]
    fn test_delivery_status_by_folio() {
        let env = setup_env();
        let state = &env.state;
        let order_id = propose_one(&env, d(2025, 1, 10));
        state.contract_api.approve_order(order_id).unwrap();
        let view = state
            .warehouse_api
            .register_receipt_at(&receipt(order_id), dt(2025, 1, 12, 12, 0, 0))
            .unwrap();

        let status = state
            .supplier_api
            .delivery_status(&view.folio, env.supplier_id)
            .unwrap();
        assert_eq!(status.order_state, OrderState::Received);
        assert_eq!(status.received_at, dt(2025, 1, 12, 12, 0, 0));

        let err = state
            .supplier_api
            .delivery_status(&view.folio, env.other_supplier_id)
            .unwrap_err();
        assert!(matches!(err, ApiError::PermissionDenied(_)));

        let err = state
            .supplier_api
            .delivery_status("RB-00000000000000-0", env.supplier_id)
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = state.supplier_api.pending_orders(9999).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_late_penalty() {
        let env = setup_env();
        let state = &env.state;
        let order_id = propose_one(&env, d(2025, 1, 10));

        let err = state.legal_api.calculate_late_penalty(order_id).unwrap_err();
        assert!(matches!(err, ApiError::InvalidStateTransition { .. }));

        state.contract_api.approve_order(order_id).unwrap();
        state
            .warehouse_api
            .register_receipt_at(&receipt(order_id), dt(2025, 1, 15, 18, 0, 0))
            .unwrap();

        let penalty = state.legal_api.calculate_late_penalty(order_id).unwrap();
        assert_eq!(penalty.days_late, 5);
        assert!((penalty.amount - 750.0).abs() < 1e-9);
        assert_eq!(penalty.detail, "5 days late * $150.00/day");

        let legal = LegalApi::new(state.uow_factory.clone(), Arc::new(MockConfig::with_rate(200.0)));
        let penalty = legal.calculate_late_penalty(order_id).unwrap();
        assert!((penalty.amount - 1000.0).abs() < 1e-9);

        let err = legal.calculate_late_penalty(9999).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_on_time_delivery_has_no_penalty() {
        let env = setup_env();
        let order_id = propose_one(&env, d(2025, 1, 10));
        env.state.contract_api.approve_order(order_id).unwrap();
        env.state
            .warehouse_api
            .register_receipt_at(&receipt(order_id), dt(2025, 1, 8, 7, 0, 0))
            .unwrap();

        let penalty = env.state.legal_api.calculate_late_penalty(order_id).unwrap();
        assert_eq!(penalty.days_late, 0);
        assert_eq!(penalty.amount, 0.0);
        assert_eq!(penalty.detail, "delivered on time or early");
    }

    #[test]
    fn test_ledger_accounts_come_from_config() {
        let env = setup_env();
        let state = &env.state;
        let order_id = propose_one(&env, d(2025, 1, 10));
        state.contract_api.approve_order(order_id).unwrap();
        let view = state
            .warehouse_api
            .register_receipt_at(&receipt(order_id), dt(2025, 1, 10, 8, 0, 0))
            .unwrap();
        state.finance_api.verify_receipt(view.id).unwrap();

        let config = MockConfig {
            debit_account: "5101-Viveres".to_string(),
            credit_account: "2111-Proveedores".to_string(),
            ..MockConfig::default()
        };
        let finance = FinanceApi::new(state.uow_factory.clone(), Arc::new(config));
        let err = finance
            .post_accounting_entry_at(view.id, Some(1), dt(2026, 1, 2, 9, 0, 0))
            .unwrap_err();
        // no user 1 in this database
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)));

        let entry = finance
            .post_accounting_entry_at(view.id, None, dt(2026, 1, 2, 9, 0, 0))
            .unwrap();
        assert!(entry.ledger_line.starts_with("POLIZA-DEVENGO-2026-CARGO:5101-Viveres/"));
        assert!(entry.ledger_line.ends_with(";ABONO:2111-Proveedores/DVS880101ABC"));
    }
}
