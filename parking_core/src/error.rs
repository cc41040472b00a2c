//! Error types shared by the session, API and calendar layers.
//!
//! Every variant renders a message that can be shown next to the action that
//! failed; nothing here is meant to reach the user as a panic.

use chrono::NaiveDate;
use thiserror::Error;

/* ---------------- messages affichés par défaut -------------------------- */

pub const LOGIN_FAILED: &str = "Login failed";
pub const SET_PASSWORD_FAILED: &str = "Failed to set password";
pub const RESET_REQUEST_FAILED: &str = "Failed to request password reset";
pub const RESET_PASSWORD_FAILED: &str = "Failed to reset password";

/* ---------------- transport --------------------------------------------- */

/// The request never produced an HTTP response (offline, CORS, DNS…).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("network error: {0}")]
pub struct TransportError(pub String);

/* ---------------- identity provider ------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("no active session")]
    NoSession,

    /// The provider answered and said no (bad credentials, expired code…).
    #[error("{}", rejected_text(.code, .message))]
    Rejected {
        code:    String,
        message: Option<String>,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unsupported sign-in challenge: {0}")]
    UnsupportedChallenge(String),

    #[error("unexpected identity provider response: {0}")]
    Protocol(String),
}

fn rejected_text<'a>(code: &'a str, message: &'a Option<String>) -> &'a str {
    message.as_deref().unwrap_or(code)
}

impl IdentityError {
    /// Human readable message, `fallback` when the provider gave none.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            IdentityError::Rejected { message: Some(m), .. } if !m.trim().is_empty() => m.clone(),
            IdentityError::Rejected { .. } => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

/* ---------------- session ----------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Bad credentials or a rejected challenge response. Session status is
    /// left as it was.
    #[error("{0}")]
    Failure(String),

    #[error("no sign-in challenge is pending")]
    NoPendingChallenge,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl AuthError {
    pub(crate) fn from_identity(err: &IdentityError, fallback: &str) -> Self {
        AuthError::Failure(err.user_message(fallback))
    }
}

/* ---------------- validation locale ------------------------------------- */

pub const BREACHED_PASSWORD_MESSAGE: &str =
    "This password has appeared in a data breach and cannot be used. Please choose a different password.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Passwords do not match")]
    Mismatch,

    #[error("{}", BREACHED_PASSWORD_MESSAGE)]
    Breached { count: u64 },
}

/* ---------------- jeton ------------------------------------------------- */

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("token is not a readable JWT: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/* ---------------- API --------------------------------------------------- */

#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable bearer token; the request was never sent.
    #[error("not signed in")]
    Unauthenticated,

    #[error("HTTP {status} – {message}")]
    Http { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/* ---------------- calendrier -------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("date {date} does not come after {previous}")]
    OutOfOrder { previous: NaiveDate, date: NaiveDate },
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("no editable entry for {0}")]
    UnknownDate(NaiveDate),

    #[error("a save is already in progress")]
    SaveInFlight,

    #[error("no save is in progress")]
    NoSaveInFlight,

    #[error("invalid calendar: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Error saving changes: {0}")]
    Save(#[from] ApiError),
}

/* ---------------- configuration ----------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing configuration value {0}")]
    Missing(&'static str),

    #[error("user pool id {0:?} does not start with a region")]
    InvalidUserPool(String),
}
