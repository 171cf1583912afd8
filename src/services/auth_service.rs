//! Identity provider adapter.
//!
//! The identity provider signs HS256 tokens; this module verifies them and
//! turns their claims into a [`Principal`]. Sign-in makes sure the caller has
//! a user record, sign-out is stateless (the client drops its token).

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::JwtConfig;
use crate::database::DocumentStore;
use crate::models::{Principal, UserProfile, UserRecord};
use crate::services::role_service;
use crate::utils::error::AppError;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // uid
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    /// Custom role claim, set out-of-band by the identity provider
    #[serde(default)]
    pub role: Option<String>,
    pub iat: usize,
    pub exp: usize,
    pub aud: String,
    pub iss: String,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Principal {
            uid: claims.sub,
            email: claims.email,
            name: claims.name,
            picture: claims.picture,
            role: claims.role,
        }
    }
}

// Verify JWT token
pub fn verify_token(jwt: &JwtConfig, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[jwt.audience.as_str()]);

    let mut issuers = HashSet::new();
    issuers.insert(jwt.issuer.clone());
    validation.iss = Some(issuers);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt.secret.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::NotAuthenticated(format!("Invalid token: {}", e)))?;

    if claims.sub.is_empty() || claims.email.trim().is_empty() {
        return Err(AppError::NotAuthenticated(
            "Token is missing the uid or email claim".to_string(),
        ));
    }

    Ok(claims)
}

pub fn principal_from_token(jwt: &JwtConfig, token: &str) -> Result<Principal, AppError> {
    verify_token(jwt, token).map(Principal::from)
}

/// Resolves the caller or fails with NOT_AUTHENTICATED.
pub fn require_principal(principal: Option<&Principal>) -> Result<&Principal, AppError> {
    principal.ok_or_else(|| AppError::NotAuthenticated("Please sign in to continue".to_string()))
}

/// First sign-in creates the user record; later sign-ins leave it untouched.
pub async fn sign_in(
    store: &dyn DocumentStore,
    principal: Option<&Principal>,
) -> Result<UserProfile, AppError> {
    let principal = require_principal(principal)?;
    let record = store
        .insert_user_if_absent(UserRecord::from_principal(principal, Utc::now()))
        .await?;

    log::info!("✅ Signed in: {} ({})", principal.email, principal.uid);

    Ok(UserProfile::new(record, role_service::is_admin(Some(principal))))
}

pub fn sign_out(principal: &Principal) {
    log::info!("👋 Signed out: {} ({})", principal.email, principal.uid);
}

// Get current user
pub async fn get_current_user(
    store: &dyn DocumentStore,
    principal: Option<&Principal>,
) -> Result<UserProfile, AppError> {
    let principal = require_principal(principal)?;
    let record = store
        .find_user(&principal.user_key())
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    Ok(UserProfile::new(record, role_service::is_admin(Some(principal))))
}

/// Mints a token the way the identity provider does. Tests only.
#[cfg(test)]
pub fn issue_token(jwt: &JwtConfig, principal: &Principal) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let iat = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: principal.uid.clone(),
        email: principal.email.clone(),
        name: principal.name.clone(),
        picture: principal.picture.clone(),
        role: principal.role.clone(),
        iat,
        exp: iat + 3600,
        aud: jwt.audience.clone(),
        iss: jwt.issuer.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_ref()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            issuer: "motto-identity".to_string(),
            audience: "motto-service".to_string(),
        }
    }

    fn principal(role: Option<&str>) -> Principal {
        Principal {
            uid: "uid-42".to_string(),
            email: "Jane.Doe@mail.com".to_string(),
            name: Some("Jane".to_string()),
            picture: Some("https://img.example/jane.png".to_string()),
            role: role.map(String::from),
        }
    }

    #[test]
    fn test_token_round_trips_to_principal() {
        let p = principal(Some("admin"));
        let token = issue_token(&jwt(), &p);
        assert_eq!(principal_from_token(&jwt(), &token).unwrap(), p);
    }

    #[test]
    fn test_rejects_foreign_tokens() {
        let token = issue_token(&jwt(), &principal(None));

        let other_secret = JwtConfig {
            secret: "someone-else".to_string(),
            ..jwt()
        };
        assert!(matches!(
            verify_token(&other_secret, &token),
            Err(AppError::NotAuthenticated(_))
        ));

        let other_audience = JwtConfig {
            audience: "another-app".to_string(),
            ..jwt()
        };
        assert!(verify_token(&other_audience, &token).is_err());
        assert!(verify_token(&jwt(), "not-a-token").is_err());
    }

    #[tokio::test]
    async fn test_sign_in_creates_record_once() {
        let store = MemoryStore::new();
        let p = principal(None);

        let first = sign_in(&store, Some(&p)).await.unwrap();
        assert_eq!(first.uid, "uid-42");
        assert!(!first.is_admin);

        let stored = store.find_user("jane_doe@mail_com").await.unwrap().unwrap();
        let again = sign_in(&store, Some(&p)).await.unwrap();
        assert_eq!(again.email, first.email);
        assert_eq!(
            store.find_user("jane_doe@mail_com").await.unwrap().unwrap().created_at,
            stored.created_at
        );
    }

    #[tokio::test]
    async fn test_current_user_requires_sign_in() {
        let store = MemoryStore::new();
        assert!(matches!(
            get_current_user(&store, Some(&principal(None))).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            get_current_user(&store, None).await,
            Err(AppError::NotAuthenticated(_))
        ));
    }
}
