// ==========================================
// Legal reports, authentication and configuration
// ==========================================


#[cfg(test)]
mod legal_auth_test {
    use procurement_engine::api::{ApiError, NonCompliancePayload};
    use procurement_engine::app::{seed_demo_data, AppState, DEMO_PASSWORD};
    use procurement_engine::config::{config_keys, ProcurementConfigReader};

    use crate::test_helpers::{create_test_db, setup_env};

    fn report(contract_id: i64, report_type: &str, state: &str) -> NonCompliancePayload {
        NonCompliancePayload {
            contract_id,
            report_type: report_type.to_string(),
            state: state.to_string(),
            description: Some("entrega incompleta".to_string()),
        }
    }

    #[test]
    fn test_non_compliance_reports() {
        let env = setup_env();
        let legal = &env.state.legal_api;

        let open = legal
            .register_non_compliance(&report(env.contract_id, "delay", "pending"))
            .unwrap();
        assert_eq!(open.report_type, "DELAY");
        assert_eq!(open.state, "PENDING");
        legal
            .register_non_compliance(&report(env.contract_id, "QUALITY", "RESOLVED"))
            .unwrap();

        let listed = legal.list_open_non_compliance().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, open.id);

        let closed = legal.resolve_non_compliance(open.id).unwrap();
        assert!(!closed.is_open());
        assert!(legal.list_open_non_compliance().unwrap().is_empty());

        let err = legal
            .register_non_compliance(&report(9999, "DELAY", "PENDING"))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = legal
            .register_non_compliance(&report(env.contract_id, " ", "PENDING"))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_penalty_rate_from_stored_config() {
        let env = setup_env();
        env.state
            .config
            .set(config_keys::PENALTY_DAILY_RATE, "200")
            .unwrap();
        assert_eq!(env.state.config.penalty_daily_rate().unwrap(), 200.0);

        env.state
            .config
            .set(config_keys::PENALTY_DAILY_RATE, "-3")
            .unwrap();
        assert_eq!(env.state.config.penalty_daily_rate().unwrap(), 150.0);
    }

    #[test]
    fn test_authentication_with_seeded_users() {
        let (_file, db_path) = create_test_db().unwrap();
        let state = AppState::new(db_path).unwrap();
        seed_demo_data(&state).unwrap();

        let user = state
            .auth_api
            .authenticate("nutri", DEMO_PASSWORD)
            .unwrap()
            .unwrap();
        assert_eq!(user.username, "nutri");
        assert_eq!(user.role.as_deref(), Some("Nutricionista"));

        assert!(state.auth_api.authenticate("nutri", "nope").unwrap().is_none());
        assert!(state.auth_api.authenticate("ghost", DEMO_PASSWORD).unwrap().is_none());
        assert!(state.auth_api.authenticate("  ", DEMO_PASSWORD).unwrap().is_none());

        let items = state.nutrition_api.list_available_items().unwrap();
        assert_eq!(items.len(), 4);
    }
}
