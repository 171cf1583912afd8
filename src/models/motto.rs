use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::user::Principal;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl FromStr for Visibility {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            _ => Err(AppError::InvalidVisibility),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// Documento da collection "mottos" (`_id` = ID escolhido pelo usuário)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Motto {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    pub visibility: Visibility,
    pub owner_uid: String,
    pub owner_email: String,
    pub owner_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub like_count: i64,
}

impl Motto {
    pub fn new(
        id: String,
        text: String,
        visibility: Visibility,
        owner: &Principal,
        now: DateTime<Utc>,
    ) -> Self {
        Motto {
            id,
            text,
            visibility,
            owner_uid: owner.uid.clone(),
            owner_email: owner.email.clone(),
            owner_name: owner.name.clone(),
            created_at: now,
            like_count: 0,
        }
    }

    /// Ownership is decided by principal id, never by email.
    pub fn is_owned_by(&self, viewer: Option<&Principal>) -> bool {
        viewer.is_some_and(|p| p.uid == self.owner_uid)
    }

    pub fn ensure_visible_to(&self, viewer: Option<&Principal>) -> Result<(), AppError> {
        match self.visibility {
            Visibility::Public => Ok(()),
            Visibility::Private if self.is_owned_by(viewer) => Ok(()),
            Visibility::Private => Err(AppError::Private),
        }
    }
}

/// Absent fields read as empty so they fail the ordered field checks.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct CreateMottoRequest {
    pub text: String,
    pub id: String,
    pub visibility: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MottoResponse {
    pub id: String,
    pub text: String,
    pub visibility: Visibility,
    pub owner_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
}

impl From<Motto> for MottoResponse {
    fn from(motto: Motto) -> Self {
        MottoResponse {
            id: motto.id,
            text: motto.text,
            visibility: motto.visibility,
            owner_name: motto.owner_name,
            created_at: motto.created_at,
            like_count: motto.like_count,
        }
    }
}

/// Motto as seen by a particular viewer.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MottoView {
    pub motto: MottoResponse,
    pub is_owner: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(uid: &str, email: &str) -> Principal {
        Principal {
            uid: uid.to_string(),
            email: email.to_string(),
            name: None,
            picture: None,
            role: None,
        }
    }

    #[test]
    fn test_visibility_parsing() {
        assert_eq!("public".parse::<Visibility>().unwrap(), Visibility::Public);
        assert_eq!("private".parse::<Visibility>().unwrap(), Visibility::Private);
        assert!(matches!(
            "PUBLIC".parse::<Visibility>(),
            Err(AppError::InvalidVisibility)
        ));
    }

    #[test]
    fn test_private_motto_visible_only_to_owner_uid() {
        let owner = principal("u-1", "owner@mail.com");
        let motto = Motto::new("secret".into(), "hi".into(), Visibility::Private, &owner, Utc::now());

        assert!(motto.ensure_visible_to(Some(&owner)).is_ok());
        assert!(matches!(motto.ensure_visible_to(None), Err(AppError::Private)));

        // same email, different uid: still not the owner
        let impostor = principal("u-2", "owner@mail.com");
        assert!(matches!(
            motto.ensure_visible_to(Some(&impostor)),
            Err(AppError::Private)
        ));
    }
}
