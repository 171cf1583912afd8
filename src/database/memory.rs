//! In-memory document store.
//!
//! Every operation holds one lock for its whole duration, which gives the
//! same isolation the MongoDB transactions provide. Used by the test suite
//! and by `STORE=memory` local runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use tokio::sync::Mutex;

use super::DocumentStore;
use crate::models::{LikeOutcome, LikeReceipt, Motto, Principal, QrCode, UserRecord};
use crate::utils::error::AppError;

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<String, UserRecord>,
    mottos: HashMap<String, Motto>,
    likes: HashMap<String, LikeReceipt>,
    qr_codes: Vec<QrCode>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_user(&self, key: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self.inner.lock().await.users.get(key).cloned())
    }

    async fn insert_user_if_absent(&self, user: UserRecord) -> Result<UserRecord, AppError> {
        let mut inner = self.inner.lock().await;
        Ok(inner
            .users
            .entry(user.key.clone())
            .or_insert(user)
            .clone())
    }

    async fn find_motto(&self, id: &str) -> Result<Option<Motto>, AppError> {
        Ok(self.inner.lock().await.mottos.get(id).cloned())
    }

    async fn create_motto(&self, owner: UserRecord, motto: Motto) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;

        if let Some(existing) = inner.users.get(&owner.key) {
            if existing.motto_id.is_some() {
                return Err(AppError::motto_already_exists());
            }
        }
        if inner.mottos.contains_key(&motto.id) {
            return Err(AppError::IdTaken);
        }

        let user = inner.users.entry(owner.key.clone()).or_insert(owner);
        user.motto_id = Some(motto.id.clone());
        user.motto_created_at = Some(motto.created_at);
        inner.mottos.insert(motto.id.clone(), motto);
        Ok(())
    }

    async fn find_like(&self, motto_id: &str, uid: &str) -> Result<Option<LikeReceipt>, AppError> {
        let key = LikeReceipt::key_for(motto_id, uid);
        Ok(self.inner.lock().await.likes.get(&key).cloned())
    }

    async fn like_motto(
        &self,
        motto_id: &str,
        liker: &Principal,
        now: DateTime<Utc>,
    ) -> Result<LikeOutcome, AppError> {
        let mut inner = self.inner.lock().await;
        let Collections { mottos, likes, .. } = &mut *inner;

        let motto = mottos
            .get_mut(motto_id)
            .ok_or_else(|| AppError::NotFound("Motto".to_string()))?;
        motto.ensure_visible_to(Some(liker))?;

        let key = LikeReceipt::key_for(motto_id, &liker.uid);
        if likes.contains_key(&key) {
            return Ok(LikeOutcome {
                already_liked: true,
                like_count: motto.like_count,
            });
        }

        likes.insert(key, LikeReceipt::new(motto_id, liker, now));
        motto.like_count += 1;
        Ok(LikeOutcome {
            already_liked: false,
            like_count: motto.like_count,
        })
    }

    async fn find_qr_code(&self, qr_code_id: &str) -> Result<Option<QrCode>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .qr_codes
            .iter()
            .find(|c| c.qr_code_id == qr_code_id)
            .cloned())
    }

    async fn list_qr_codes(&self) -> Result<Vec<QrCode>, AppError> {
        Ok(self.inner.lock().await.qr_codes.clone())
    }

    async fn insert_qr_code(&self, mut code: QrCode) -> Result<QrCode, AppError> {
        let mut inner = self.inner.lock().await;
        if inner.qr_codes.iter().any(|c| c.qr_code_id == code.qr_code_id) {
            return Err(AppError::AlreadyExists(format!(
                "QR code {} already exists",
                code.qr_code_id
            )));
        }
        code.id = Some(ObjectId::new());
        inner.qr_codes.push(code.clone());
        Ok(code)
    }

    async fn link_qr_code(
        &self,
        qr_code_id: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<QrCode, AppError> {
        let mut inner = self.inner.lock().await;

        if let Some(code) = inner.qr_codes.iter_mut().find(|c| c.qr_code_id == qr_code_id) {
            if code.is_linked {
                return Err(AppError::AlreadyLinked(
                    code.linked_user_email.clone().unwrap_or_default(),
                ));
            }
            code.is_linked = true;
            code.linked_user_email = Some(email.to_string());
            code.linked_at = Some(now);
            return Ok(code.clone());
        }

        let mut code = QrCode::linked(qr_code_id.to_string(), email.to_string(), now);
        code.id = Some(ObjectId::new());
        inner.qr_codes.push(code.clone());
        Ok(code)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
