use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::motto::MottoResponse;

pub const SOURCE_PRODUCTION: &str = "production";
pub const SOURCE_SCAN: &str = "scan";

/// Documento da collection "qr_codes" (chave lógica: `qrCodeId`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub qr_code_id: String,
    pub is_linked: bool,
    #[serde(default)]
    pub linked_user_email: Option<String>,
    #[serde(default)]
    pub linked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl QrCode {
    /// Label printed ahead of time, waiting to be linked.
    pub fn unlinked(qr_code_id: String, now: DateTime<Utc>) -> Self {
        QrCode {
            id: None,
            qr_code_id,
            is_linked: false,
            linked_user_email: None,
            linked_at: None,
            created_at: now,
            source: Some(SOURCE_PRODUCTION.to_string()),
        }
    }

    /// Label scanned by an operator before it was ever registered.
    pub fn linked(qr_code_id: String, email: String, now: DateTime<Utc>) -> Self {
        QrCode {
            id: None,
            qr_code_id,
            is_linked: true,
            linked_user_email: Some(email),
            linked_at: Some(now),
            created_at: now,
            source: Some(SOURCE_SCAN.to_string()),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeResponse {
    pub id: String,
    pub qr_code_id: String,
    pub is_linked: bool,
    pub linked_user_email: Option<String>,
    pub linked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub source: Option<String>,
}

impl From<QrCode> for QrCodeResponse {
    fn from(code: QrCode) -> Self {
        QrCodeResponse {
            id: code.id.map(|id| id.to_hex()).unwrap_or_default(),
            qr_code_id: code.qr_code_id,
            is_linked: code.is_linked,
            linked_user_email: code.linked_user_email,
            linked_at: code.linked_at,
            created_at: code.created_at,
            source: code.source,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQrCodeRequest {
    pub qr_code_id: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkQrCodeRequest {
    pub user_email: Option<String>,
}

/// Public page reached by scanning a linked label.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QrProfile {
    pub qr_code_id: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub motto: MottoResponse,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeUrlResponse {
    pub qr_code_id: String,
    pub qr_code_url: String,
    pub message: String,
}
