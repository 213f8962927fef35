// ==========================================
// Procurement Engine - users, roles, suppliers
// ==========================================

use serde::{Deserialize, Serialize};

/// Role, e.g. Admin / Supplier / Nutritionist / Warehouse / Accountant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub permissions: serde_json::Value, // free-form permission flags
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String, // argon2 PHC string
    pub role_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub legal_name: String,
    pub tax_id: String, // RFC, unique
    pub contact_email: Option<String>,
}
