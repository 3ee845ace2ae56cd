//! CMS settings rendered on public pages.

use quickpick_api::{ApiClient, ApiError};
use quickpick_core::CmsSetting;
use tracing::instrument;

/// Read-only access to CMS settings.
#[derive(Debug, Clone)]
pub struct Content {
    client: ApiClient,
}

impl Content {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// All settings.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self))]
    pub async fn settings(&self) -> Result<Vec<CmsSetting>, ApiError> {
        self.client.get("settings").await
    }

    /// One setting by key, or `None` if the server has no such key.
    ///
    /// # Errors
    ///
    /// Returns any API error other than not-found.
    #[instrument(skip(self))]
    pub async fn setting(&self, key: &str) -> Result<Option<CmsSetting>, ApiError> {
        match self
            .client
            .get(&format!("settings/{}", urlencoding::encode(key)))
            .await
        {
            Ok(setting) => Ok(Some(setting)),
            Err(ApiError::NotFound(_) | ApiError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// A setting's text in `locale`, falling back as [`quickpick_core::LocalizedText::get`] does.
    ///
    /// # Errors
    ///
    /// Returns any API error other than not-found.
    pub async fn text(&self, key: &str, locale: &str) -> Result<Option<String>, ApiError> {
        Ok(self
            .setting(key)
            .await?
            .map(|s| s.value.get(locale).to_owned())
            .filter(|t| !t.is_empty()))
    }
}
