// ==========================================
// Procurement Engine - authentication API
// ==========================================
// Password hashes are argon2 PHC strings stored in app_user.password_hash
// ==========================================

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::perf::PerfGuard;
use crate::repository::{Criteria, UnitOfWorkFactory};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
    pub role: Option<String>,
}

/// Hash `password` into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| ApiError::InternalError(format!("salt encoding failed: {}", e)))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::InternalError(format!("password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// False for wrong passwords and for unparseable hashes.
pub fn verify_password(password: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!(error = %e, "stored password hash is not a PHC string");
            false
        }
    }
}

pub struct AuthApi {
    uow_factory: Arc<UnitOfWorkFactory>,
}

impl AuthApi {
    pub fn new(uow_factory: Arc<UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// `Ok(None)` for an unknown user or a wrong password.
    pub fn authenticate(&self, username: &str, password: &str) -> ApiResult<Option<AuthenticatedUser>> {
        let _perf = PerfGuard::new("auth_api.authenticate");
        let username = username.trim();
        if username.is_empty() {
            return Ok(None);
        }

        self.uow_factory.read(|uow| {
            let user = match uow
                .users()
                .find_one_by(&Criteria::new().eq("username", username.to_string()))?
            {
                Some(u) => u,
                None => return Ok(None),
            };

            if !verify_password(password, &user.password_hash) {
                warn!(username, "authentication failed");
                return Ok(None);
            }

            let role = match user.role_id {
                Some(role_id) => uow.roles().get(role_id)?.map(|r| r.name),
                None => None,
            };

            info!(user_id = user.id, username, "user authenticated");
            Ok(Some(AuthenticatedUser {
                user_id: user.id,
                username: user.username,
                role,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let phc = hash_password("admin123").unwrap();
        assert!(phc.starts_with("$argon2"));
        assert!(verify_password("admin123", &phc));
        assert!(!verify_password("admin124", &phc));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("x", "plaintext"));
    }
}
