//! Role / authorization checks.
//!
//! Roles live in the identity provider as a token claim. This service only
//! reads them; assigning a role goes through the [`RoleAdmin`] backend, which
//! must be wired to the provider's privileged credential API to do anything.

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::models::{Principal, ADMIN_ROLE};
use crate::services::auth_service;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(AppError::InvalidRole),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

/// True iff the caller's role claim is exactly `admin`. Anonymous is never admin.
pub fn is_admin(principal: Option<&Principal>) -> bool {
    principal
        .and_then(|p| p.role.as_deref())
        .is_some_and(|role| role == ADMIN_ROLE)
}

pub fn require_admin(principal: Option<&Principal>) -> Result<(), AppError> {
    let p = auth_service::require_principal(principal)?;
    if is_admin(Some(p)) {
        return Ok(());
    }
    log::warn!("🚫 Admin action refused for {} ({})", p.email, p.uid);
    Err(AppError::NotAdmin)
}

/// Backend able to change a principal's role claim at the identity provider.
#[async_trait]
pub trait RoleAdmin: Send + Sync {
    async fn set_role(&self, uid: &str, role: Role) -> Result<(), AppError>;
}

/// Default backend: refuses every change until a real one is configured.
#[derive(Debug, Default)]
pub struct UnconfiguredRoleAdmin;

#[async_trait]
impl RoleAdmin for UnconfiguredRoleAdmin {
    async fn set_role(&self, uid: &str, role: Role) -> Result<(), AppError> {
        log::warn!(
            "⚠️⚠️  ROLE ADMIN NOT CONFIGURED: refusing to set role '{}' for {}. \
             No identity provider credential API is wired in.",
            role,
            uid
        );
        Err(AppError::NotConfigured(
            "Role administration backend is not configured".to_string(),
        ))
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetRoleRequest {
    pub uid: Option<String>,
    pub role: Option<String>,
}

/// Validates the request and forwards it to the role backend.
pub async fn set_role(
    backend: &dyn RoleAdmin,
    request: &SetRoleRequest,
) -> Result<String, AppError> {
    let (uid, role) = match (request.uid.as_deref(), request.role.as_deref()) {
        (Some(uid), Some(role)) if !uid.trim().is_empty() && !role.trim().is_empty() => {
            (uid.trim(), role.trim())
        }
        _ => return Err(AppError::MissingField("UID and role are required")),
    };

    let role: Role = role.parse()?;
    backend.set_role(uid, role).await?;

    log::info!("🔑 Role for {} set to {}", uid, role);
    Ok(format!("User role set to {}", role))
}
