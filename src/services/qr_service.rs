//! QR label linking.
//!
//! Labels are produced ahead of time (unlinked) or scanned straight from the
//! press (created already linked). Either way a label links exactly once.

use chrono::Utc;

use crate::database::DocumentStore;
use crate::models::{QrCode, QrCodeUrlResponse, QrProfile};
use crate::utils::error::AppError;
use crate::utils::validation::{normalize_code_id, normalize_email_key, normalize_user_email};

pub async fn link_code_to_user(
    store: &dyn DocumentStore,
    code_id: &str,
    email: &str,
) -> Result<QrCode, AppError> {
    let code_id = normalize_code_id(code_id)?;
    let email = normalize_user_email(email)?;

    match store.link_qr_code(&code_id, &email, Utc::now()).await {
        Ok(code) => {
            log::info!("🔗 QR code {} linked to {}", code_id, email);
            Ok(code)
        }
        Err(e) => {
            if let AppError::AlreadyLinked(owner) = &e {
                log::warn!(
                    "⚠️  QR code {} already linked to {}, refused relink to {}",
                    code_id,
                    owner,
                    email
                );
            }
            Err(e)
        }
    }
}

pub async fn create_code_for_production(
    store: &dyn DocumentStore,
    code_id: &str,
) -> Result<QrCode, AppError> {
    let code_id = normalize_code_id(code_id)?;

    let code = store
        .insert_qr_code(QrCode::unlinked(code_id, Utc::now()))
        .await?;

    log::info!("🏭 QR code {} registered for production", code.qr_code_id);
    Ok(code)
}

/// Public page behind a scanned label: the linked user and their motto.
///
/// Scanners are anonymous, so a private motto fails with `Private`.
pub async fn resolve_profile_by_code(
    store: &dyn DocumentStore,
    code_id: &str,
) -> Result<QrProfile, AppError> {
    let code = get_code(store, code_id).await?;

    let email = match (code.is_linked, code.linked_user_email.as_deref()) {
        (true, Some(email)) => email,
        _ => return Err(AppError::NotLinked),
    };

    let user = store
        .find_user(&normalize_email_key(email))
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    let motto_id = user
        .motto_id
        .as_deref()
        .ok_or_else(|| AppError::NotFound("Motto".to_string()))?;

    let motto = store
        .find_motto(motto_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Motto".to_string()))?;
    motto.ensure_visible_to(None)?;

    Ok(QrProfile {
        qr_code_id: code.qr_code_id,
        name: user.name,
        image: user.image,
        motto: motto.into(),
    })
}

pub async fn get_code(store: &dyn DocumentStore, code_id: &str) -> Result<QrCode, AppError> {
    let code_id = normalize_code_id(code_id)?;
    store
        .find_qr_code(&code_id)
        .await?
        .ok_or_else(|| AppError::NotFound("QR code".to_string()))
}

/// All labels, newest first.
pub async fn list_codes(store: &dyn DocumentStore) -> Result<Vec<QrCode>, AppError> {
    let mut codes = store.list_qr_codes().await?;
    codes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(codes)
}

/// URL printed on the label for `code_id`.
pub fn qr_code_url(base_url: &str, code_id: &str) -> Result<QrCodeUrlResponse, AppError> {
    let code_id = normalize_code_id(code_id)?;
    let url = format!(
        "{}/qr/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(&code_id)
    );

    Ok(QrCodeUrlResponse {
        qr_code_id: code_id,
        qr_code_url: url,
        message: "QR code URL generated successfully".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::{CreateMottoRequest, Principal, SOURCE_PRODUCTION, SOURCE_SCAN};
    use crate::services::{auth_service, motto_service};
    use std::sync::Arc;

    fn customer() -> Principal {
        Principal {
            uid: "cust-1".to_string(),
            email: "customer@mail.com".to_string(),
            name: Some("Customer".to_string()),
            picture: Some("https://img.example/c.png".to_string()),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_production_code_links_once() {
        let store = MemoryStore::new();

        let created = create_code_for_production(&store, " ab12 ").await.unwrap();
        assert_eq!(created.qr_code_id, "AB12");
        assert!(!created.is_linked);
        assert_eq!(created.source.as_deref(), Some(SOURCE_PRODUCTION));

        assert!(matches!(
            create_code_for_production(&store, "AB12").await,
            Err(AppError::AlreadyExists(_))
        ));

        let linked = link_code_to_user(&store, "ab12", " Customer@Mail.com ")
            .await
            .unwrap();
        assert!(linked.is_linked);
        assert_eq!(linked.linked_user_email.as_deref(), Some("customer@mail.com"));
        assert_eq!(linked.id, created.id);

        match link_code_to_user(&store, "AB12", "intruder@mail.com").await {
            Err(AppError::AlreadyLinked(owner)) => assert_eq!(owner, "customer@mail.com"),
            other => panic!("expected AlreadyLinked, got {:?}", other),
        }
        let stored = get_code(&store, "AB12").await.unwrap();
        assert_eq!(stored.linked_user_email.as_deref(), Some("customer@mail.com"));
    }

    #[tokio::test]
    async fn test_scanning_unknown_code_creates_it_linked() {
        let store = MemoryStore::new();

        let code = link_code_to_user(&store, "NEW1", "customer@mail.com")
            .await
            .unwrap();
        assert!(code.is_linked);
        assert_eq!(code.source.as_deref(), Some(SOURCE_SCAN));
        assert_eq!(list_codes(&store).await.unwrap().len(), 1);

        assert!(matches!(
            link_code_to_user(&store, "", "a@b.c").await,
            Err(AppError::MissingField(_))
        ));
        assert!(matches!(
            link_code_to_user(&store, "NEW2", "  ").await,
            Err(AppError::MissingField(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_links_have_one_winner() {
        let store = Arc::new(MemoryStore::new());

        let mut handles = Vec::new();
        for n in 0..6 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                link_code_to_user(&*store, "RACE", &format!("user{}@mail.com", n)).await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(e) => assert!(matches!(e, AppError::AlreadyLinked(_))),
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_resolve_profile() {
        let store = MemoryStore::new();

        assert!(matches!(
            resolve_profile_by_code(&store, "NONE").await,
            Err(AppError::NotFound(_))
        ));

        create_code_for_production(&store, "LBL1").await.unwrap();
        assert!(matches!(
            resolve_profile_by_code(&store, "LBL1").await,
            Err(AppError::NotLinked)
        ));

        link_code_to_user(&store, "LBL1", "customer@mail.com").await.unwrap();
        // linked, but the customer never signed in
        assert!(matches!(
            resolve_profile_by_code(&store, "LBL1").await,
            Err(AppError::NotFound(_))
        ));

        auth_service::sign_in(&store, Some(&customer())).await.unwrap();
        assert!(matches!(
            resolve_profile_by_code(&store, "LBL1").await,
            Err(AppError::NotFound(_))
        ));

        let request = CreateMottoRequest {
            text: "Be kind".to_string(),
            id: "bekind".to_string(),
            visibility: "public".to_string(),
        };
        motto_service::create_motto(&store, &request, Some(&customer()))
            .await
            .unwrap();

        let profile = resolve_profile_by_code(&store, "lbl1").await.unwrap();
        assert_eq!(profile.qr_code_id, "LBL1");
        assert_eq!(profile.name.as_deref(), Some("Customer"));
        assert_eq!(profile.motto.text, "Be kind");
    }

    #[tokio::test]
    async fn test_private_motto_stays_off_the_label() {
        let store = MemoryStore::new();
        let request = CreateMottoRequest {
            text: "Just for me".to_string(),
            id: "secret".to_string(),
            visibility: "private".to_string(),
        };
        motto_service::create_motto(&store, &request, Some(&customer()))
            .await
            .unwrap();
        link_code_to_user(&store, "LBL2", "customer@mail.com").await.unwrap();

        assert!(matches!(
            resolve_profile_by_code(&store, "LBL2").await,
            Err(AppError::Private)
        ));
    }

    #[tokio::test]
    async fn test_mixed_case_email_resolves() {
        let store = MemoryStore::new();
        let jane = Principal {
            uid: "jane-1".to_string(),
            email: "Jane.Doe@Mail.com".to_string(),
            name: Some("Jane".to_string()),
            picture: None,
            role: None,
        };
        auth_service::sign_in(&store, Some(&jane)).await.unwrap();
        let request = CreateMottoRequest {
            text: "Onward".to_string(),
            id: "janed".to_string(),
            visibility: "public".to_string(),
        };
        motto_service::create_motto(&store, &request, Some(&jane))
            .await
            .unwrap();

        link_code_to_user(&store, "TEE1", "Jane.Doe@Mail.com").await.unwrap();

        let profile = resolve_profile_by_code(&store, "TEE1").await.unwrap();
        assert_eq!(profile.name.as_deref(), Some("Jane"));
        assert_eq!(profile.motto.id, "janed");
    }

    #[tokio::test]
    async fn test_list_codes_newest_first() {
        let store = MemoryStore::new();
        create_code_for_production(&store, "OLD").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        create_code_for_production(&store, "NEW").await.unwrap();

        let ids: Vec<String> = list_codes(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.qr_code_id)
            .collect();
        assert_eq!(ids, vec!["NEW".to_string(), "OLD".to_string()]);
    }

    #[test]
    fn test_qr_code_url_encodes_id() {
        let url = qr_code_url("https://ikikae.example/", "ab 12").unwrap();
        assert_eq!(url.qr_code_id, "AB 12");
        assert_eq!(url.qr_code_url, "https://ikikae.example/qr/AB%2012");
        assert!(qr_code_url("https://ikikae.example", " ").is_err());
    }
}
