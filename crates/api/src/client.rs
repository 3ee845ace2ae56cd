//! QuickPick REST API transport.
//!
//! [`ApiClient`] owns the `reqwest` client and base URL and turns responses
//! into typed values or [`ApiError`]s. It knows nothing about sessions: the
//! bearer token is passed in by [`crate::Session`] for authenticated calls.

use std::sync::Arc;

use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Header carrying a per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Maximum characters of a response body to include in logs.
const LOG_BODY_LIMIT: usize = 500;

/// Client for the QuickPick REST API.
///
/// Cheaply cloneable; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    locale: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("locale", &self.inner.locale)
            .finish_non_exhaustive()
    }
}

/// A request body.
pub enum Body<'a, B: Serialize + ?Sized> {
    None,
    Json(&'a B),
    Multipart(reqwest::multipart::Form),
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or the locale is not a
    /// valid header value.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("quickpick-client/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.locale)
                .map_err(|e| ApiError::Validation(format!("Invalid locale: {e}")))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.clone(),
                locale: config.locale.clone(),
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Preferred content locale.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.inner.locale
    }

    /// Resolve an API path (leading `/` optional) against the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` if the path cannot be joined.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// `GET` a public endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not 2xx.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send::<(), T>(Method::GET, path, None, Body::None).await
    }

    /// `GET` a public endpoint with query parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not 2xx.
    pub async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        let builder = self.builder(Method::GET, url, None).query(query);
        self.execute(builder).await
    }

    /// `POST` JSON to a public endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not 2xx.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, None, Body::Json(body)).await
    }

    /// Send a request, optionally authenticated with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not 2xx.
    pub async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
        body: Body<'_, B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        let builder = self.builder(method, url, token);
        let builder = match body {
            Body::None => builder,
            Body::Json(body) => builder.json(body),
            Body::Multipart(form) => builder.multipart(form),
        };
        self.execute(builder).await
    }

    fn builder(&self, method: Method, url: Url, token: Option<&SecretString>) -> RequestBuilder {
        let request_id = uuid::Uuid::new_v4().to_string();
        debug!(%method, %url, %request_id, "API request");

        let builder = self
            .inner
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id);

        match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send the request and decode a 2xx JSON body.
    ///
    /// An empty body decodes as JSON `null`, so `()` and `Option<T>` work for
    /// endpoints that return nothing.
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().clone();

        // Get response body as text first for better error diagnostics
        let text = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &text);
            if status.is_server_error() {
                error!(
                    status = %status,
                    url = %url,
                    body = %truncate(&text),
                    "QuickPick API returned server error"
                );
            } else {
                debug!(status = %status, url = %url, message = %err, "QuickPick API rejected request");
            }
            return Err(err);
        }

        let body = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(body).map_err(|e| {
            error!(
                error = %e,
                url = %url,
                body = %truncate(&text),
                "Failed to parse QuickPick API response"
            );
            ApiError::Decode(e)
        })
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(LOG_BODY_LIMIT).collect()
}
