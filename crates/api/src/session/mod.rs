//! Auth/session holder.
//!
//! [`Session`] holds the signed-in user and bearer token, persists them to a
//! [`SessionStore`], and is the only way to make authenticated API calls. Any
//! 401 from an authenticated call clears the session and surfaces as
//! [`ApiError::Unauthorized`] carrying the scope's sign-in route.

mod store;

pub use store::{FileSessionStore, MemorySessionStore, SessionStore, SessionStoreError, StoredSession};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use quickpick_core::{Email, Gender, User};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::client::{ApiClient, Body};
use crate::error::ApiError;
use crate::route::{AuthScope, Route};

/// Minimum password length accepted on the signup form.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Email + password sign-in credentials.
pub struct Credentials {
    pub email: Email,
    pub password: SecretString,
}

impl Credentials {
    /// Validate raw form input.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the email is malformed or the
    /// password is empty.
    pub fn parse(email: &str, password: &str) -> Result<Self, ApiError> {
        let email = Email::parse(email).map_err(|e| ApiError::Validation(format!("Email: {e}")))?;
        if password.is_empty() {
            return Err(ApiError::Validation("Password is required".to_owned()));
        }
        Ok(Self {
            email,
            password: SecretString::from(password.to_owned()),
        })
    }

    fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "email": self.email,
            "password": self.password.expose_secret(),
        })
    }
}

/// Signup form.
pub struct SignupForm {
    pub name: String,
    pub email: Email,
    pub password: SecretString,
    pub phone: Option<String>,
    pub gender: Option<Gender>,
}

impl SignupForm {
    /// Required-field checks done before any request.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` naming the first problem found.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("Name is required".to_owned()));
        }
        if self.password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        Ok(())
    }

    fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name.trim(),
            "email": self.email,
            "password": self.password.expose_secret(),
            "phone": self.phone,
            "gender": self.gender,
        })
    }
}

/// Response of the login and register endpoints.
#[derive(Deserialize)]
struct AuthResponse {
    token: String,
    user: User,
}

/// Result of re-validating a persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restored {
    /// The server accepted the token; the cached user has been refreshed.
    Active(User),
    /// No usable session; credentials are cleared.
    SignedOut(Route),
}

struct SessionState {
    token: SecretString,
    user: User,
}

/// The signed-in user and their bearer token.
///
/// Cheaply cloneable; clones share state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client: ApiClient,
    store: Arc<dyn SessionStore>,
    scope: AuthScope,
    state: RwLock<Option<SessionState>>,
    sign_outs: AtomicU64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("client", &self.inner.client)
            .field("scope", &self.inner.scope)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a signed-out session. Call [`Session::restore`] to pick up a
    /// persisted one.
    #[must_use]
    pub fn new(client: ApiClient, store: Arc<dyn SessionStore>, scope: AuthScope) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                client,
                store,
                scope,
                state: RwLock::new(None),
                sign_outs: AtomicU64::new(0),
            }),
        }
    }

    /// The underlying transport, for public endpoints.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    /// Which sign-in screen this session belongs to.
    #[must_use]
    pub fn scope(&self) -> AuthScope {
        self.inner.scope
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.inner.state.read().await.as_ref().map(|s| s.user.clone())
    }

    /// Whether a token is held.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.state.read().await.is_some()
    }

    /// Exchange credentials for a token and persist the session.
    ///
    /// # Errors
    ///
    /// Returns the server's message on rejection, or a store error if the
    /// session cannot be persisted.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let response: AuthResponse = self
            .inner
            .client
            .post("auth/login", &credentials.body())
            .await?;
        self.establish(response).await
    }

    /// Register a new account and sign in.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, the server's message on
    /// rejection, or a store error.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn signup(&self, form: &SignupForm) -> Result<User, ApiError> {
        form.validate()?;
        let response: AuthResponse = self
            .inner
            .client
            .post("auth/register", &form.body())
            .await?;
        self.establish(response).await
    }

    async fn establish(&self, response: AuthResponse) -> Result<User, ApiError> {
        let stored = StoredSession {
            token: response.token,
            user: response.user,
        };
        self.inner.store.save(&stored)?;
        let user = stored.user.clone();
        *self.inner.state.write().await = Some(SessionState {
            token: SecretString::from(stored.token),
            user: stored.user,
        });
        info!(user_id = %user.id, "Signed in");
        Ok(user)
    }

    /// Re-validate the persisted session against `GET /auth/me`.
    ///
    /// Any failure, 401 or otherwise, clears stored credentials and returns
    /// the sign-in route.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Restored {
        let stored = match self.inner.store.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => return Restored::SignedOut(self.inner.scope.login_route()),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session");
                self.clear().await;
                return Restored::SignedOut(self.inner.scope.login_route());
            }
        };

        *self.inner.state.write().await = Some(SessionState {
            token: SecretString::from(stored.token),
            user: stored.user,
        });

        match self.get::<User>("auth/me").await {
            Ok(user) => match self.set_user(user.clone()).await {
                Ok(()) => Restored::Active(user),
                Err(e) => {
                    warn!(error = %e, "Failed to persist refreshed user");
                    Restored::Active(user)
                }
            },
            Err(e) => {
                warn!(error = %e, "Session re-validation failed");
                self.clear().await;
                Restored::SignedOut(self.inner.scope.login_route())
            }
        }
    }

    /// Sign out: tell the server best-effort, then always clear local state.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Route {
        if self.is_authenticated().await
            && let Err(e) = self.post::<_, serde_json::Value>("auth/logout", &()).await
        {
            warn!(error = %e, "Server logout failed; clearing local session anyway");
        }
        self.clear().await;
        self.inner.scope.login_route()
    }

    /// Replace the cached user (after a profile edit or balance refresh).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotAuthenticated` when signed out, or a store error.
    pub async fn set_user(&self, user: User) -> Result<(), ApiError> {
        let mut state = self.inner.state.write().await;
        let current = state.as_mut().ok_or(ApiError::NotAuthenticated)?;
        self.inner.store.save(&StoredSession {
            token: current.token.expose_secret().to_owned(),
            user: user.clone(),
        })?;
        current.user = user;
        Ok(())
    }

    /// Number of times this session has been cleared.
    ///
    /// Holders of per-user data compare it against the value they were
    /// filled under and start over when it moves.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.sign_outs.load(Ordering::Acquire)
    }

    /// Drop in-memory and persisted credentials.
    pub async fn clear(&self) {
        *self.inner.state.write().await = None;
        self.inner.sign_outs.fetch_add(1, Ordering::AcqRel);
        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "Failed to clear persisted session");
        }
    }

    // =========================================================================
    // Authenticated requests
    // =========================================================================

    /// Authenticated `GET`.
    ///
    /// # Errors
    ///
    /// See [`Session::send`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send::<(), T>(Method::GET, path, Body::None).await
    }

    /// Authenticated `POST` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Session::send`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Body::Json(body)).await
    }

    /// Authenticated `PUT` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Session::send`].
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, Body::Json(body)).await
    }

    /// Authenticated `PATCH` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Session::send`].
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PATCH, path, Body::Json(body)).await
    }

    /// Authenticated `DELETE`; any response body is ignored.
    ///
    /// # Errors
    ///
    /// See [`Session::send`].
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send::<(), serde_json::Value>(Method::DELETE, path, Body::None)
            .await
            .map(drop)
    }

    /// Authenticated multipart upload.
    ///
    /// # Errors
    ///
    /// See [`Session::send`].
    pub async fn send_multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        self.send::<(), T>(method, path, Body::Multipart(form)).await
    }

    /// Send an authenticated request.
    ///
    /// # Errors
    ///
    /// - `ApiError::NotAuthenticated` if signed out (no request is sent)
    /// - `ApiError::Unauthorized` on 401; the session is cleared first
    /// - any other transport or API error unchanged
    pub async fn send<B, T>(&self, method: Method, path: &str, body: Body<'_, B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self
            .inner
            .state
            .read()
            .await
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(ApiError::NotAuthenticated)?;

        match self
            .inner
            .client
            .send(method, path, Some(&token), body)
            .await
        {
            Err(e) if e.is_unauthorized() => {
                warn!(path, "Session rejected by server; signing out");
                self.clear().await;
                Err(ApiError::Unauthorized {
                    redirect: self.inner.scope.login_route(),
                })
            }
            other => other,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_parse() {
        assert!(Credentials::parse("a@b.co", "pw").is_ok());
        assert!(matches!(
            Credentials::parse("nope", "pw"),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            Credentials::parse("a@b.co", ""),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_credentials_body() {
        let creds = Credentials::parse("A@B.co", "hunter22").unwrap();
        let body = creds.body();
        assert_eq!(body["email"], "a@b.co");
        assert_eq!(body["password"], "hunter22");
    }

    #[test]
    fn test_signup_validation() {
        let form = SignupForm {
            name: "  ".to_owned(),
            email: Email::parse("x@y.com").unwrap(),
            password: SecretString::from("longenough".to_owned()),
            phone: None,
            gender: None,
        };
        assert_eq!(form.validate().unwrap_err().to_string(), "Name is required");

        let form = SignupForm {
            name: "Laila".to_owned(),
            password: SecretString::from("12345".to_owned()),
            ..form
        };
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "Password must be at least 6 characters"
        );
    }

    #[tokio::test]
    async fn test_authenticated_call_without_session_sends_nothing() {
        let config = crate::ApiConfig::for_base_url("http://127.0.0.1:9").unwrap();
        let session = Session::new(
            ApiClient::new(&config).unwrap(),
            Arc::new(MemorySessionStore::new()),
            AuthScope::Storefront,
        );
        let result = session.get::<serde_json::Value>("wallet/balance").await;
        assert!(matches!(result, Err(ApiError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_clear_moves_generation() {
        let config = crate::ApiConfig::for_base_url("http://127.0.0.1:9").unwrap();
        let session = Session::new(
            ApiClient::new(&config).unwrap(),
            Arc::new(MemorySessionStore::new()),
            AuthScope::Storefront,
        );
        let before = session.generation();
        session.clear().await;
        assert_eq!(session.generation(), before + 1);
        assert_eq!(session.clone().generation(), before + 1);
    }
}
