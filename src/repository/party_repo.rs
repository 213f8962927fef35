// ==========================================
// Procurement Engine - role / user / supplier tables
// ==========================================

use rusqlite::types::Value;
use rusqlite::Row;

use crate::domain::party::{Role, Supplier, User};
use crate::repository::error::RepositoryResult;
use crate::repository::mapping::{get_json, opt_int, opt_text, TableMapping};
use crate::repository::sql_repository::SqlRepository;

pub type RoleRepository<'c> = SqlRepository<'c, Role>;
pub type UserRepository<'c> = SqlRepository<'c, User>;
pub type SupplierRepository<'c> = SqlRepository<'c, Supplier>;

impl TableMapping for Role {
    const ENTITY: &'static str = "Role";
    const TABLE: &'static str = "role";
    const COLUMNS: &'static [&'static str] = &["name", "permissions"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_values(&self) -> RepositoryResult<Vec<Value>> {
        Ok(vec![
            Value::Text(self.name.clone()),
            Value::Text(serde_json::to_string(&self.permissions)?),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Role {
            id: row.get(0)?,
            name: row.get(1)?,
            permissions: get_json(row, 2, "permissions")?,
        })
    }
}

impl TableMapping for User {
    const ENTITY: &'static str = "User";
    const TABLE: &'static str = "app_user";
    const COLUMNS: &'static [&'static str] = &["username", "password_hash", "role_id"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_values(&self) -> RepositoryResult<Vec<Value>> {
        Ok(vec![
            Value::Text(self.username.clone()),
            Value::Text(self.password_hash.clone()),
            opt_int(self.role_id),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            role_id: row.get(3)?,
        })
    }
}

impl TableMapping for Supplier {
    const ENTITY: &'static str = "Supplier";
    const TABLE: &'static str = "supplier";
    const COLUMNS: &'static [&'static str] = &["legal_name", "tax_id", "contact_email"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_values(&self) -> RepositoryResult<Vec<Value>> {
        Ok(vec![
            Value::Text(self.legal_name.clone()),
            Value::Text(self.tax_id.clone()),
            opt_text(&self.contact_email),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Supplier {
            id: row.get(0)?,
            legal_name: row.get(1)?,
            tax_id: row.get(2)?,
            contact_email: row.get(3)?,
        })
    }
}
