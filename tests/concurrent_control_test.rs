// ==========================================
// Concurrency control
// ==========================================
// Each unit of work holds the write lock from BEGIN IMMEDIATE,
// so racing transitions on one order serialize.
// ==========================================


#[cfg(test)]
mod concurrent_control_test {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use procurement_engine::api::{ApiError, ContractApi, ProgrammingPayload};
    use procurement_engine::domain::{OrderProposal, OrderState};

    use crate::test_helpers::{d, setup_env};

    #[test]
    fn test_concurrent_approve_single_winner() {
        let env = setup_env();
        let order_id = env
            .state
            .warehouse_api
            .propose_orders(&[OrderProposal {
                contract_id: env.contract_id,
                scheduled_delivery: d(2025, 1, 10),
            }])
            .unwrap()[0]
            .id;

        const THREADS: usize = 6;
        let barrier = Arc::new(Barrier::new(THREADS));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let api = ContractApi::new(env.state.uow_factory.clone());
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    api.approve_order(order_id)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "{:?}", results);
        for r in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                matches!(r, ApiError::InvalidStateTransition { .. }),
                "unexpected error {:?}",
                r
            );
        }

        let pending = env.state.contract_api.list_orders_pending_approval().unwrap();
        assert!(pending.is_empty());
        let mine = env.state.supplier_api.pending_orders(env.supplier_id).unwrap();
        assert_eq!(mine[0].state, OrderState::Approved);
    }

    #[test]
    fn test_concurrent_programming_saves_keep_one_row() {
        let env = setup_env();
        let item = env.item("AB-001");
        let state = Arc::new(env.state);

        let handles: Vec<_> = (1..=4)
            .map(|n: i64| {
                let state = state.clone();
                thread::spawn(move || {
                    state.nutrition_api.save_programming(&ProgrammingPayload {
                        user_id: None,
                        contract_item_id: item,
                        month: d(2025, 5, 1),
                        daily_quantities: [(1u32, n * 10)].into_iter().collect(),
                    })
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }

        let availability = state.nutrition_api.availability(item).unwrap();
        // Exactly one row survives, holding one of the written totals
        assert!([10, 20, 30, 40].contains(&availability.programmed_quantity));
    }
}
