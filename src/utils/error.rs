use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::api::metrics;

/// Broad family an [`AppError`] belongs to. Drives the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Authorization,
    Infrastructure,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Carries the full message, e.g. "QR Code ID is required".
    #[error("{0}")]
    MissingField(&'static str),

    #[error("Invalid request body")]
    InvalidBody,

    #[error("Motto ID must be 4-12 characters using letters, numbers, underscores or hyphens")]
    InvalidId,

    #[error("Visibility must be either public or private")]
    InvalidVisibility,

    #[error("Please enter a motto")]
    EmptyMotto,

    #[error("Motto must be at most {0} characters")]
    MottoTooLong(usize),

    #[error("Role must be either admin or user")]
    InvalidRole,

    #[error("{0}")]
    AlreadyExists(String),

    #[error("This motto ID is already taken")]
    IdTaken,

    #[error("QR code is already linked to {0}")]
    AlreadyLinked(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("This QR code is not linked to a customer yet")]
    NotLinked,

    #[error("This motto is private")]
    Private,

    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("Admin access required")]
    NotAdmin,

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Database error: {0}")]
    Store(String),
}

impl AppError {
    /// Stable machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingField(_) => "MISSING_FIELD",
            AppError::InvalidBody => "INVALID_BODY",
            AppError::InvalidId => "INVALID_ID",
            AppError::InvalidVisibility => "INVALID_VISIBILITY",
            AppError::EmptyMotto => "EMPTY_MOTTO",
            AppError::MottoTooLong(_) => "MOTTO_TOO_LONG",
            AppError::InvalidRole => "INVALID_ROLE",
            AppError::AlreadyExists(_) => "ALREADY_EXISTS",
            AppError::IdTaken => "ID_TAKEN",
            AppError::AlreadyLinked(_) => "ALREADY_LINKED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::NotLinked => "NOT_LINKED",
            AppError::Private => "PRIVATE",
            AppError::NotAuthenticated(_) => "NOT_AUTHENTICATED",
            AppError::NotAdmin => "NOT_ADMIN",
            AppError::NotConfigured(_) => "NOT_CONFIGURED",
            AppError::Store(_) => "STORE_ERROR",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::MissingField(_)
            | AppError::InvalidId
            | AppError::InvalidBody
            | AppError::InvalidVisibility
            | AppError::EmptyMotto
            | AppError::MottoTooLong(_)
            | AppError::InvalidRole => ErrorKind::Validation,
            AppError::AlreadyExists(_) | AppError::IdTaken | AppError::AlreadyLinked(_) => {
                ErrorKind::Conflict
            }
            AppError::NotFound(_) | AppError::NotLinked => ErrorKind::NotFound,
            AppError::Private | AppError::NotAuthenticated(_) | AppError::NotAdmin => {
                ErrorKind::Authorization
            }
            AppError::NotConfigured(_) | AppError::Store(_) => ErrorKind::Infrastructure,
        }
    }

    pub fn motto_already_exists() -> Self {
        AppError::AlreadyExists(
            "You already have a motto. Each user can only create one motto.".to_string(),
        )
    }

    /// Wraps any store/driver failure.
    pub fn store(e: impl std::fmt::Display) -> Self {
        AppError::Store(e.to_string())
    }

    /// Message safe to show to the caller. Store failures are logged, not echoed.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Store(_) => "Something went wrong. Please try again later.".to_string(),
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotAuthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Private | AppError::NotAdmin => StatusCode::FORBIDDEN,
            AppError::NotConfigured(_) => StatusCode::NOT_IMPLEMENTED,
            _ => match self.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Authorization => StatusCode::FORBIDDEN,
                ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        metrics::increment_error_count();
        if self.kind() == ErrorKind::Infrastructure {
            log::error!("❌ {}", self);
        }

        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            error: self.public_message(),
            code: self.code(),
        })
    }
}
