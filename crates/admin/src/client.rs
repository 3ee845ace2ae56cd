//! Back-office client and sign-in guard.
//!
//! [`AdminClient`] wraps an admin-scoped [`Session`], so any 401 clears the
//! admin session and redirects to `/admin/login`. Resource operations live
//! in sibling modules as `impl AdminClient` blocks.

use std::sync::Arc;

use quickpick_api::{
    ApiClient, ApiConfig, AuthScope, Credentials, FileSessionStore, Restored, Route, Session,
    SessionStore,
};
use quickpick_core::User;
use tracing::{info, instrument, warn};

use crate::error::AdminError;

/// Build `"{resource}/{id}"` with the id percent-encoded.
pub(crate) fn resource_path(resource: &str, id: &str) -> String {
    format!("{resource}/{}", urlencoding::encode(id))
}

/// Append `key=value` pairs, percent-encoded, to a path.
pub(crate) fn with_query(path: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_owned();
    }
    let query: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect();
    format!("{path}?{}", query.join("&"))
}

/// Client for the QuickPick back-office endpoints.
///
/// Cheaply cloneable; clones share the session.
#[derive(Debug, Clone)]
pub struct AdminClient {
    session: Session,
}

impl AdminClient {
    /// Build a client with a file-backed session at
    /// `config.admin_session_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, AdminError> {
        let store = Arc::new(FileSessionStore::new(&config.admin_session_path));
        Self::with_store(config, store)
    }

    /// Build a client with a custom session store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_store(config: &ApiConfig, store: Arc<dyn SessionStore>) -> Result<Self, AdminError> {
        let client = ApiClient::new(config)?;
        Ok(Self {
            session: Session::new(client, store, AuthScope::Admin),
        })
    }

    /// The admin session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The signed-in admin, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.session.current_user().await
    }

    /// Sign in, refusing non-admin accounts.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotAdmin` (after clearing the session) for
    /// customer accounts, or the server's rejection.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<User, AdminError> {
        let user = self.session.login(credentials).await?;
        if !user.is_admin {
            warn!(user_id = %user.id, "Non-admin account refused");
            self.session.clear().await;
            return Err(AdminError::NotAdmin);
        }
        info!(user_id = %user.id, "Admin signed in");
        Ok(user)
    }

    /// Re-validate the persisted admin session.
    ///
    /// A session whose user has lost admin rights is cleared.
    pub async fn restore(&self) -> Restored {
        match self.session.restore().await {
            Restored::Active(user) if !user.is_admin => {
                warn!(user_id = %user.id, "Stored admin session no longer has admin rights");
                self.session.clear().await;
                Restored::SignedOut(Route::AdminLogin)
            }
            other => other,
        }
    }

    /// Sign out.
    pub async fn logout(&self) -> Route {
        self.session.logout().await
    }
}
