use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::validation::normalize_email_key;

/// Role claim value that grants admin screens and actions.
pub const ADMIN_ROLE: &str = "admin";

/// Authenticated identity performing a request, resolved from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub role: Option<String>,
}

impl Principal {
    /// Key of this principal's record in `users`.
    pub fn user_key(&self) -> String {
        normalize_email_key(&self.email)
    }
}

/// Documento da collection "users" (`_id` = email normalizado)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub key: String,
    pub uid: String,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Set once when the user claims a motto, never changed afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motto_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motto_created_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Fresh record for a principal signing in for the first time.
    pub fn from_principal(principal: &Principal, now: DateTime<Utc>) -> Self {
        UserRecord {
            key: principal.user_key(),
            uid: principal.uid.clone(),
            name: principal.name.clone(),
            email: principal.email.clone(),
            image: principal.picture.clone(),
            created_at: now,
            motto_id: None,
            motto_created_at: None,
        }
    }
}

/// Perfil devolvido ao cliente após login
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub motto_id: Option<String>,
    pub is_admin: bool,
}

impl UserProfile {
    pub fn new(record: UserRecord, is_admin: bool) -> Self {
        UserProfile {
            uid: record.uid,
            email: record.email,
            name: record.name,
            image: record.image,
            motto_id: record.motto_id,
            is_admin,
        }
    }
}
