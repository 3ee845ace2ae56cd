//! QuickPick API - transport and session handling.
//!
//! # Architecture
//!
//! - [`ApiClient`] wraps `reqwest` with the base URL, locale, and request IDs
//! - [`Session`] holds the bearer token and user, persists them through a
//!   [`SessionStore`], and signs the user out on any 401
//! - [`Route`] and [`Notice`] are what operations hand back to the front end
//!   instead of navigating or rendering alerts themselves
//!
//! The server is the source of truth; nothing here validates business rules
//! beyond required fields.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quickpick_api::{ApiClient, ApiConfig, AuthScope, Credentials, FileSessionStore, Session};
//!
//! let config = ApiConfig::from_env()?;
//! let client = ApiClient::new(&config)?;
//! let store = Arc::new(FileSessionStore::new(&config.session_path));
//! let session = Session::new(client, store, AuthScope::Storefront);
//!
//! session.login(&Credentials::parse("me@example.com", "secret")?).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod error;
pub mod route;
pub mod session;

pub use client::ApiClient;
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, FALLBACK_MESSAGE, Notice, Severity};
pub use route::{AuthScope, Route};
pub use session::{
    Credentials, FileSessionStore, MemorySessionStore, Restored, Session, SessionStore,
    SessionStoreError, SignupForm, StoredSession,
};
