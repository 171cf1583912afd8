use chrono::Utc;

use crate::database::DocumentStore;
use crate::models::{LikeOutcome, Principal};
use crate::services::auth_service::require_principal;
use crate::utils::error::AppError;

/// One like per user per motto. Repeats report `already_liked` and write nothing.
pub async fn like_motto(
    store: &dyn DocumentStore,
    motto_id: &str,
    principal: Option<&Principal>,
) -> Result<LikeOutcome, AppError> {
    let principal = require_principal(principal)?;

    let outcome = store.like_motto(motto_id, principal, Utc::now()).await?;

    if outcome.already_liked {
        log::debug!("👍 {} already liked '{}'", principal.uid, motto_id);
    } else {
        log::info!(
            "❤️  '{}' liked by {} (now {})",
            motto_id,
            principal.uid,
            outcome.like_count
        );
    }
    Ok(outcome)
}

/// Whether the caller has liked the motto, under the same visibility rule as reads.
pub async fn get_like_status(
    store: &dyn DocumentStore,
    motto_id: &str,
    principal: Option<&Principal>,
) -> Result<bool, AppError> {
    let principal = require_principal(principal)?;

    let motto = store
        .find_motto(motto_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Motto".to_string()))?;
    motto.ensure_visible_to(Some(principal))?;

    Ok(store.find_like(motto_id, &principal.uid).await?.is_some())
}
