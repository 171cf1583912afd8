use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::Principal;

/// One per (motto, user). Composite key: `{motto_id}:{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeReceipt {
    #[serde(rename = "_id")]
    pub key: String,
    pub motto_id: String,
    pub uid: String,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
}

impl LikeReceipt {
    /// Motto ids never contain `:`, so the key is unambiguous.
    pub fn key_for(motto_id: &str, uid: &str) -> String {
        format!("{}:{}", motto_id, uid)
    }

    pub fn new(motto_id: &str, liker: &Principal, now: DateTime<Utc>) -> Self {
        LikeReceipt {
            key: Self::key_for(motto_id, &liker.uid),
            motto_id: motto_id.to_string(),
            uid: liker.uid.clone(),
            user_email: liker.email.clone(),
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeOutcome {
    pub already_liked: bool,
    pub like_count: i64,
}
