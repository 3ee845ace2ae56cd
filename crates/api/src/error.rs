//! API error type and user-facing notices.
//!
//! Every failure ends up as text shown to the user: a non-2xx response's JSON
//! `message` field, or [`FALLBACK_MESSAGE`] when the body has none.

use serde::Deserialize;
use thiserror::Error;

use crate::route::Route;
use crate::session::SessionStoreError;

/// Shown when the server gives no usable message.
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors that can occur when talking to the QuickPick API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The session was rejected; local credentials have been cleared.
    #[error("Your session has expired. Please sign in again.")]
    Unauthorized { redirect: Route },

    /// An authenticated call was attempted without a session.
    #[error("Please sign in to continue.")]
    NotAuthenticated,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body could not be decoded.
    #[error("Unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),

    /// Request path could not be joined to the base URL.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    /// Reading or writing the persisted session failed.
    #[error("Session storage error: {0}")]
    Store(#[from] SessionStoreError),

    /// Input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// HTTP status, when the error came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }

    /// Whether this is a 401 (raw or already mapped to a redirect).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }

    /// Where the user should be sent, if anywhere.
    #[must_use]
    pub const fn redirect(&self) -> Option<&Route> {
        match self {
            Self::Unauthorized { redirect } => Some(redirect),
            _ => None,
        }
    }

    /// Build an `Api` error from a status and raw response body.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        if status == 404 && message_from_body(body).is_none() {
            return Self::NotFound(FALLBACK_MESSAGE.to_owned());
        }
        Self::Api {
            status,
            message: message_from_body(body).unwrap_or_else(|| FALLBACK_MESSAGE.to_owned()),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Extract the `message` (or `error`) field from a JSON error body.
#[must_use]
pub fn message_from_body(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .map(|m| m.trim().to_owned())
        .filter(|m| !m.is_empty())
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Info,
    Error,
}

/// A dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    /// A success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    /// An informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    /// An error notice built from any error's display text.
    #[must_use]
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        let message = err.to_string();
        Self {
            severity: Severity::Error,
            message: if message.trim().is_empty() {
                FALLBACK_MESSAGE.to_owned()
            } else {
                message
            },
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_body() {
        assert_eq!(
            message_from_body(r#"{"message": "Out of stock"}"#).as_deref(),
            Some("Out of stock")
        );
        assert_eq!(
            message_from_body(r#"{"error": "Invalid promo"}"#).as_deref(),
            Some("Invalid promo")
        );
        assert_eq!(message_from_body(r#"{"message": "  "}"#), None);
        assert_eq!(message_from_body("<html>502</html>"), None);
    }

    #[test]
    fn test_from_response_uses_fallback() {
        let err = ApiError::from_response(500, "");
        assert_eq!(err.to_string(), FALLBACK_MESSAGE);
        assert_eq!(err.status(), Some(500));

        let err = ApiError::from_response(400, r#"{"message":"Cart is empty"}"#);
        assert_eq!(err.to_string(), "Cart is empty");
    }

    #[test]
    fn test_from_response_not_found() {
        assert!(matches!(
            ApiError::from_response(404, ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_response(404, r#"{"message":"No such order"}"#),
            ApiError::Api { status: 404, .. }
        ));
    }

    #[test]
    fn test_unauthorized_helpers() {
        let raw = ApiError::from_response(401, r#"{"message":"jwt expired"}"#);
        assert!(raw.is_unauthorized());
        assert!(raw.redirect().is_none());

        let mapped = ApiError::Unauthorized {
            redirect: Route::AdminLogin,
        };
        assert!(mapped.is_unauthorized());
        assert_eq!(mapped.redirect(), Some(&Route::AdminLogin));
    }

    #[test]
    fn test_notice_from_error() {
        let notice = Notice::from_error(&ApiError::Validation("Name is required".to_owned()));
        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(notice.message, "Name is required");

        let empty = Notice::from_error(&ApiError::Validation(String::new()));
        assert_eq!(empty.message, FALLBACK_MESSAGE);
    }
}
