// Centralized error handling for the calendar

use crate::i18n::catalog::FALLBACK_LOCALE;
use crate::i18n::Translator;
use crate::render::html;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// The caller lacks the privilege required for the attempted operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PermissionError {
    message: String,
}

impl PermissionError {
    /// Build a permission error, falling back to the generic localized message
    pub fn new(message: Option<String>, tr: &Translator) -> Self {
        let message = message.unwrap_or_else(|| tr.get("permission-error").to_string());
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failures of the backing store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Malformed record: missing column '{field}'")]
    MalformedRecord { field: &'static str },

    #[error("Stored user has reserved uid {uid}")]
    InvalidUid { uid: i64 },

    #[error("Database connection lock poisoned")]
    Poisoned,
}

/// Errors returned by request handlers
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl CalendarError {
    /// Render the error page in the caller's language
    pub fn into_localized_response(self, tr: &Translator) -> Response {
        let (status, message) = match &self {
            // Soft errors: shown to the user inside the normal page body
            CalendarError::Permission(e) => (StatusCode::FORBIDDEN, e.message().to_string()),
            CalendarError::InvalidParameter(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            CalendarError::InvalidCredentials(message) => {
                (StatusCode::UNAUTHORIZED, message.clone())
            }
            CalendarError::Storage(e) => {
                error!(error = %e, "Storage failure while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    tr.get("internal-error").to_string(),
                )
            }
        };

        (status, Html(html::message_box(&message))).into_response()
    }
}

/// Used when the request failed before its language was known
impl IntoResponse for CalendarError {
    fn into_response(self) -> Response {
        self.into_localized_response(&Translator::new(FALLBACK_LOCALE))
    }
}
