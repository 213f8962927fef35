// ==========================================
// Procurement Engine - demo data
// ==========================================
// Roles, one user per role, two suppliers and contract LPL 01-2025.
// Skipped entirely when the database already has roles.
// ==========================================

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::info;

use crate::api::{hash_password, ApiError, ApiResult, ContractPayload, SupplierPayload};
use crate::app::state::AppState;
use crate::domain::{ContractItemInput, Role, User};
use crate::repository::Criteria;

/// Password shared by all demo users.
pub const DEMO_PASSWORD: &str = "123";

pub const DEMO_BID_CODE: &str = "LPL 01-2025";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedSummary {
    pub roles: usize,
    pub users: usize,
    pub suppliers: usize,
    pub contract_items: usize,
}

impl SeedSummary {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

const ROLES: [(&str, &str); 5] = [
    ("Admin", "superuser"),
    ("Proveedor", "portal_access"),
    ("Nutricionista", "planning"),
    ("Almacenista", "inventory"),
    ("Contador", "accounting"),
];

const USERS: [(&str, &str); 4] = [
    ("admin", "Admin"),
    ("nutri", "Nutricionista"),
    ("almacen", "Almacenista"),
    ("contador", "Contador"),
];

pub fn seed_demo_data(state: &AppState) -> ApiResult<SeedSummary> {
    // Hashing is slow; do it before the write lock is taken.
    let mut hashed = Vec::with_capacity(USERS.len());
    for (username, role) in USERS {
        hashed.push((username, role, hash_password(DEMO_PASSWORD)?));
    }

    let (roles, users) = state.uow_factory.run(|uow| {
        if uow.roles().count_by(&Criteria::new())? > 0 {
            return Ok::<_, ApiError>((0, 0));
        }

        for (name, flag) in ROLES {
            let mut permissions = Map::new();
            permissions.insert(flag.to_string(), Value::Bool(true));
            let mut role = Role {
                id: 0,
                name: name.to_string(),
                permissions: Value::Object(permissions),
            };
            uow.roles().add(&mut role)?;
        }

        for (username, role_name, password_hash) in &hashed {
            let role = uow
                .roles()
                .find_one_by(&Criteria::new().eq("name", role_name.to_string()))?;
            let mut user = User {
                id: 0,
                username: username.to_string(),
                password_hash: password_hash.clone(),
                role_id: role.map(|r| r.id),
            };
            uow.users().add(&mut user)?;
        }
        Ok((ROLES.len(), hashed.len()))
    })?;

    if roles == 0 {
        info!("database already seeded");
        return Ok(SeedSummary::default());
    }

    let viveres = state.contract_api.register_supplier(SupplierPayload {
        legal_name: "ALFONSO NUÑEZ DE LA O".to_string(),
        tax_id: "DVS880101ABC".to_string(),
        contact_email: Some("ventas@viveressureste.com".to_string()),
    })?;
    state.contract_api.register_supplier(SupplierPayload {
        legal_name: "T-MEDIC, SA DE CV".to_string(),
        tax_id: "APG951215XYZ".to_string(),
        contact_email: Some("contacto@alimentosgolfo.com".to_string()),
    })?;

    let contract = state.contract_api.save_contract(ContractPayload {
        id: None,
        bid_code: DEMO_BID_CODE.to_string(),
        file_path: Some("/docs/contratos/2025/LPL-01.pdf".to_string()),
        start_date: date(2025, 1, 1)?,
        end_date: date(2025, 12, 31)?,
        supplier_id: viveres.id,
        items: demo_items(),
    })?;

    let summary = SeedSummary {
        roles,
        users,
        suppliers: 2,
        contract_items: contract.items.len(),
    };
    info!(?summary, "demo data seeded");
    Ok(summary)
}

fn demo_items() -> Vec<ContractItemInput> {
    [
        ("AB-001", "Arroz Blanco Super Extra", "kg", 22.50, 5000, "GRANOS"),
        ("FR-003", "Frijol Negro", "kg", 35.00, 8000, "GRANOS"),
        ("LT-010", "Leche Entera UHT 1L", "pza", 25.80, 10000, "LACTEOS"),
        ("EN-005", "Atún en Aceite 140g", "lata", 18.75, 12000, "ENLATADOS"),
    ]
    .into_iter()
    .map(|(key, description, unit, price, max, class)| ContractItemInput {
        item_key: key.to_string(),
        description: description.to_string(),
        unit: unit.to_string(),
        unit_price: price,
        max_quantity: max,
        classification: Some(class.to_string()),
    })
    .collect()
}

fn date(y: i32, m: u32, d: u32) -> ApiResult<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| ApiError::InternalError(format!("invalid date {}-{}-{}", y, m, d)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_seed_is_idempotent() {
        let file = NamedTempFile::new().unwrap();
        let state = AppState::new(file.path().to_str().unwrap()).unwrap();

        let first = seed_demo_data(&state).unwrap();
        assert_eq!(first.roles, 5);
        assert_eq!(first.users, 4);
        assert_eq!(first.contract_items, 4);

        let second = seed_demo_data(&state).unwrap();
        assert!(second.is_empty());
        assert_eq!(state.contract_api.list_suppliers().unwrap().len(), 2);
    }

    #[test]
    fn test_seeded_admin_can_log_in() {
        let file = NamedTempFile::new().unwrap();
        let state = AppState::new(file.path().to_str().unwrap()).unwrap();
        seed_demo_data(&state).unwrap();

        let user = state
            .auth_api
            .authenticate("admin", DEMO_PASSWORD)
            .unwrap()
            .unwrap();
        assert_eq!(user.role.as_deref(), Some("Admin"));
        assert!(state.auth_api.authenticate("admin", "wrong").unwrap().is_none());
    }
}
