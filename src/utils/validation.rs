use lazy_static::lazy_static;
use regex::Regex;

use crate::utils::error::AppError;

/// Longest motto text accepted, in characters.
pub const MAX_MOTTO_CHARS: usize = 280;

lazy_static! {
    static ref MOTTO_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{4,12}$").unwrap();
}

/// User records are keyed by the lower-cased email with `. # $ [ ]` replaced by `_`.
pub fn normalize_email_key(email: &str) -> String {
    email
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '.' | '#' | '$' | '[' | ']' => '_',
            other => other,
        })
        .collect()
}

pub fn validate_motto_id(id: &str) -> Result<(), AppError> {
    if MOTTO_ID_RE.is_match(id) {
        Ok(())
    } else {
        Err(AppError::InvalidId)
    }
}

/// Trims the motto and enforces the length cap.
pub fn normalize_motto_text(text: &str) -> Result<String, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::EmptyMotto);
    }
    if trimmed.chars().count() > MAX_MOTTO_CHARS {
        return Err(AppError::MottoTooLong(MAX_MOTTO_CHARS));
    }
    Ok(trimmed.to_string())
}

/// Printed labels are upper-case; scans and lookups are normalized to match.
pub fn normalize_code_id(code_id: &str) -> Result<String, AppError> {
    let trimmed = code_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::MissingField("QR Code ID is required"));
    }
    Ok(trimmed.to_uppercase())
}

pub fn normalize_user_email(email: &str) -> Result<String, AppError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(AppError::MissingField("User email is required"));
    }
    Ok(trimmed.to_lowercase())
}
