use chrono::Utc;

use crate::database::DocumentStore;
use crate::models::{CreateMottoRequest, Motto, MottoView, Principal, UserRecord, Visibility};
use crate::services::auth_service::require_principal;
use crate::utils::error::AppError;
use crate::utils::validation::{normalize_motto_text, validate_motto_id};

/// Claims `request.id` for the caller and stores the motto.
///
/// The checks below give early, ordered errors; the store call re-checks the
/// owner pointer and the id inside one atomic unit, so a lost race still
/// fails with `IdTaken` (or `AlreadyExists` for the same user).
pub async fn create_motto(
    store: &dyn DocumentStore,
    request: &CreateMottoRequest,
    principal: Option<&Principal>,
) -> Result<String, AppError> {
    let principal = require_principal(principal)?;

    if let Some(user) = store.find_user(&principal.user_key()).await? {
        if user.motto_id.is_some() {
            return Err(AppError::motto_already_exists());
        }
    }

    validate_motto_id(&request.id)?;
    let visibility: Visibility = request.visibility.parse()?;
    let text = normalize_motto_text(&request.text)?;

    if store.find_motto(&request.id).await?.is_some() {
        return Err(AppError::IdTaken);
    }

    let now = Utc::now();
    let motto = Motto::new(request.id.clone(), text, visibility, principal, now);
    store
        .create_motto(UserRecord::from_principal(principal, now), motto)
        .await?;

    log::info!(
        "✍️  Motto '{}' ({}) created by {}",
        request.id,
        visibility,
        principal.email
    );
    Ok(request.id.clone())
}

/// The caller's own motto; `None` when they have none or the pointer dangles.
pub async fn get_motto_by_owner(
    store: &dyn DocumentStore,
    principal: Option<&Principal>,
) -> Result<Option<Motto>, AppError> {
    let principal = require_principal(principal)?;

    let motto_id = match store.find_user(&principal.user_key()).await? {
        Some(UserRecord {
            motto_id: Some(id), ..
        }) => id,
        _ => return Ok(None),
    };

    let motto = store.find_motto(&motto_id).await?;
    if motto.is_none() {
        log::warn!(
            "⚠️  User {} points at missing motto '{}'",
            principal.email,
            motto_id
        );
    }
    Ok(motto)
}

pub async fn get_motto_by_id(
    store: &dyn DocumentStore,
    id: &str,
    viewer: Option<&Principal>,
) -> Result<MottoView, AppError> {
    let motto = store
        .find_motto(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Motto".to_string()))?;

    motto.ensure_visible_to(viewer)?;

    let is_owner = motto.is_owned_by(viewer);
    Ok(MottoView {
        motto: motto.into(),
        is_owner,
    })
}
