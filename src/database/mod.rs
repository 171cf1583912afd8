//! Document store seam.
//!
//! Every operation that decides a contested unique field (motto id, like
//! receipt, printed QR code id) is a single atomic call here, so the
//! services never do read-check-then-write on their own.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{LikeOutcome, LikeReceipt, Motto, Principal, QrCode, UserRecord};
use crate::utils::error::AppError;

pub use memory::MemoryStore;
pub use mongo::MongoDB;

pub const USERS: &str = "users";
pub const MOTTOS: &str = "mottos";
pub const MOTTO_LIKES: &str = "motto_likes";
pub const QR_CODES: &str = "qr_codes";

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_user(&self, key: &str) -> Result<Option<UserRecord>, AppError>;

    /// Inserts `user` unless a record with the same key exists; returns the stored record.
    async fn insert_user_if_absent(&self, user: UserRecord) -> Result<UserRecord, AppError>;

    async fn find_motto(&self, id: &str) -> Result<Option<Motto>, AppError>;

    /// Atomically writes `motto` and points the owner's user record at it.
    ///
    /// `owner` is inserted first if the user record does not exist yet.
    /// Fails with `AlreadyExists` if the owner already holds a motto and with
    /// `IdTaken` if the id names an existing motto.
    async fn create_motto(&self, owner: UserRecord, motto: Motto) -> Result<(), AppError>;

    async fn find_like(&self, motto_id: &str, uid: &str) -> Result<Option<LikeReceipt>, AppError>;

    /// Atomically records a like: visibility check, receipt lookup, receipt
    /// write and counter increment all happen in one isolated unit.
    async fn like_motto(
        &self,
        motto_id: &str,
        liker: &Principal,
        now: DateTime<Utc>,
    ) -> Result<LikeOutcome, AppError>;

    async fn find_qr_code(&self, qr_code_id: &str) -> Result<Option<QrCode>, AppError>;

    async fn list_qr_codes(&self) -> Result<Vec<QrCode>, AppError>;

    /// Fails with `AlreadyExists` if a record with the same `qrCodeId` exists.
    async fn insert_qr_code(&self, code: QrCode) -> Result<QrCode, AppError>;

    /// Conditional write keyed on `qrCodeId`: links an unlinked record,
    /// creates a linked one if absent, fails `AlreadyLinked` otherwise.
    async fn link_qr_code(
        &self,
        qr_code_id: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<QrCode, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}
