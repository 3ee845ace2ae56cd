//! CMS settings management.

use quickpick_api::ApiError;
use quickpick_core::{CmsSetting, LocalizedText};
use reqwest::Method;
use reqwest::multipart::Form;
use tracing::{info, instrument};

use crate::client::{AdminClient, resource_path};
use crate::error::AdminError;
use crate::upload::ImageUpload;

/// Whether a settings key is usable: lowercase ASCII letters, digits, `_`,
/// `-` and `.`.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'))
}

impl AdminClient {
    /// List settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_settings(&self) -> Result<Vec<CmsSetting>, AdminError> {
        Ok(self.session().get("settings").await?)
    }

    /// Create or replace a setting, optionally with an image.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, or the API error.
    #[instrument(skip(self, value, image))]
    pub async fn upsert_setting(
        &self,
        key: &str,
        value: &LocalizedText,
        image: Option<ImageUpload>,
    ) -> Result<CmsSetting, AdminError> {
        if !is_valid_key(key) {
            return Err(AdminError::validation(format!(
                "Invalid setting key: {key:?}"
            )));
        }
        if value.is_blank() && image.is_none() {
            return Err(AdminError::validation(
                "A setting needs text or an image",
            ));
        }

        let value = serde_json::to_string(value).map_err(|e| AdminError::Api(ApiError::from(e)))?;
        let mut form = Form::new().text("key", key.to_owned()).text("value", value);
        if let Some(image) = image {
            form = form.part("image", image.into_part()?);
        }

        let setting: CmsSetting = self
            .session()
            .send_multipart(Method::PUT, &resource_path("settings", key), form)
            .await?;
        info!("Setting saved");
        Ok(setting)
    }

    /// Delete a setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn delete_setting(&self, key: &str) -> Result<(), AdminError> {
        self.session().delete(&resource_path("settings", key)).await?;
        info!("Setting deleted");
        Ok(())
    }
}
