//! Back-office errors.

use std::path::PathBuf;

use quickpick_api::{ApiError, Route};
use thiserror::Error;

/// Errors from back-office operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The credentials belong to a customer account.
    #[error("This account does not have admin access")]
    NotAdmin,

    /// An image could not be read for upload.
    #[error("Could not read image {path}: {source}")]
    Upload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport, API, or validation failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AdminError {
    /// Where to send the user, if anywhere.
    #[must_use]
    pub const fn redirect(&self) -> Option<&Route> {
        match self {
            Self::NotAdmin => Some(&Route::AdminLogin),
            Self::Api(e) => e.redirect(),
            Self::Upload { .. } => None,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Api(ApiError::Validation(message.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirects() {
        assert_eq!(AdminError::NotAdmin.redirect(), Some(&Route::AdminLogin));
        let expired = AdminError::Api(ApiError::Unauthorized {
            redirect: Route::AdminLogin,
        });
        assert_eq!(expired.redirect(), Some(&Route::AdminLogin));
        assert_eq!(AdminError::validation("Code is required").redirect(), None);
        assert_eq!(
            AdminError::validation("Code is required").to_string(),
            "Code is required"
        );
    }
}
