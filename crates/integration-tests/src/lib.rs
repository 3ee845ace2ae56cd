//! End-to-end tests for the QuickPick client.
//!
//! [`FakeApi`] binds an axum server to an ephemeral port, answers each
//! `METHOD /path` with a canned JSON response, and records every request so
//! tests can assert on what the client sent, or that it sent nothing.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p quickpick-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let api = FakeApi::start().await;
//! api.on(Method::GET, "categories", json!([fixtures::category("c1", true)]));
//! let shop = Storefront::with_store(api.config(), api.signed_in(fixtures::user("u1", false, 20.0)))?;
//! shop.catalog().categories().await?;
//! assert_eq!(api.requests_to(&Method::GET, "categories").len(), 1);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{Json, Router};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Uri};
use axum::response::{IntoResponse, Response};
use quickpick_api::{ApiConfig, MemorySessionStore};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub use axum::http::{Method, StatusCode};

/// Bearer token handed out by fixture sessions.
pub const TOKEN: &str = "test-token";

/// Path prefix the fake API is mounted under.
const PREFIX: &str = "/api";

/// A request as the fake API saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path below the API prefix, with a leading `/`.
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    /// Parsed JSON body, `Null` when empty, or the raw text otherwise.
    pub body: Value,
}

type Routes = HashMap<(Method, String), (StatusCode, Value)>;

#[derive(Default)]
struct FakeState {
    routes: Mutex<Routes>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// A scripted stand-in for the QuickPick REST API.
pub struct FakeApi {
    base_url: String,
    state: Arc<FakeState>,
}

fn normalize(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

impl FakeApi {
    /// Start a server on `127.0.0.1` with an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake API listener");
        let addr = listener.local_addr().expect("fake API address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}{PREFIX}/"),
            state,
        }
    }

    /// Client configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the generated base URL is rejected.
    #[must_use]
    pub fn config(&self) -> ApiConfig {
        ApiConfig::for_base_url(&self.base_url).expect("fake API base URL")
    }

    /// Answer `method path` with `200` and `body`.
    pub fn on(&self, method: Method, path: &str, body: Value) -> &Self {
        self.on_status(method, path, StatusCode::OK, body)
    }

    /// Answer `method path` with `status` and `body`.
    pub fn on_status(&self, method: Method, path: &str, status: StatusCode, body: Value) -> &Self {
        self.state
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((method, normalize(path)), (status, body));
        self
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for `method path`.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<RecordedRequest> {
        let path = normalize(path);
        self.requests()
            .into_iter()
            .filter(|r| r.method == *method && r.path == path)
            .collect()
    }

    /// A memory store holding a session for `user` (a fixture JSON object),
    /// with `auth/me` answering that user.
    ///
    /// # Panics
    ///
    /// Panics if `user` is not a valid user object.
    #[must_use]
    pub fn signed_in(&self, user: Value) -> Arc<MemorySessionStore> {
        self.on(Method::GET, "auth/me", user.clone());
        Arc::new(MemorySessionStore::with_session(fixtures::session(user)))
    }
}

async fn handle(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path();
    let path = normalize(path.strip_prefix(PREFIX).unwrap_or(path));

    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };

    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: uri.query().map(str::to_owned),
            authorization: headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            body,
        });

    let canned = state
        .routes
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&(method, path))
        .cloned();

    match canned {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" }))).into_response(),
    }
}

/// JSON payloads shaped like the QuickPick API's.
pub mod fixtures {
    use quickpick_api::StoredSession;
    use serde_json::{Value, json};

    use super::TOKEN;

    #[must_use]
    pub fn user(id: &str, is_admin: bool, wallet_balance: f64) -> Value {
        json!({
            "_id": id,
            "name": "Hana Ali",
            "email": format!("{id}@example.com"),
            "wallet_balance": wallet_balance,
            "is_admin": is_admin,
        })
    }

    #[must_use]
    pub fn category(id: &str, is_visible: bool) -> Value {
        json!({
            "_id": id,
            "name": { "en": format!("Category {id}"), "ar": "فئة" },
            "is_visible": is_visible,
        })
    }

    #[must_use]
    pub fn product(id: &str, price: f64, stock: u32) -> Value {
        json!({
            "_id": id,
            "name": { "en": format!("Product {id}") },
            "description": "Fresh",
            "price": price,
            "stock": stock,
            "category": "c1",
        })
    }

    #[must_use]
    pub fn address(id: &str, is_default: bool) -> Value {
        json!({
            "_id": id,
            "label": "Home",
            "full_name": "Hana Ali",
            "phone": "01000000000",
            "street": "12 Nile St",
            "city": "Cairo",
            "is_default": is_default,
        })
    }

    #[must_use]
    pub fn order(id: &str, status: &str, payment_method: &str, total: f64) -> Value {
        json!({
            "_id": id,
            "status": status,
            "payment_status": "pending",
            "payment_method": payment_method,
            "items": [{ "product": "p1", "quantity": 2, "price": 10.0 }],
            "total": total,
            "shipping_address": {
                "full_name": "Hana Ali",
                "phone": "01000000000",
                "street": "12 Nile St",
                "city": "Cairo",
            },
            "created_at": "2026-10-01T09:30:00Z",
        })
    }

    /// A persisted session for a fixture user.
    ///
    /// # Panics
    ///
    /// Panics if `user` is not a valid user object.
    #[must_use]
    pub fn session(user: Value) -> StoredSession {
        StoredSession {
            token: TOKEN.to_owned(),
            user: serde_json::from_value(user).expect("fixture user"),
        }
    }
}
