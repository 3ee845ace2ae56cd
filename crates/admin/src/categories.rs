//! Category management.

use quickpick_core::{Category, CategoryId, LocalizedText};
use serde::Serialize;
use tracing::{info, instrument};

use crate::client::{AdminClient, resource_path};
use crate::error::AdminError;

/// Fields for creating or updating a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInput {
    pub name: LocalizedText,
    pub is_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CategoryInput {
    fn validate(&self) -> Result<(), AdminError> {
        if self.name.is_blank() {
            return Err(AdminError::validation("Category name is required"));
        }
        Ok(())
    }
}

impl AdminClient {
    /// All categories, hidden ones included.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, AdminError> {
        Ok(self.session().get("categories").await?)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, or the API error.
    #[instrument(skip(self, input))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, AdminError> {
        input.validate()?;
        let category: Category = self.session().post("categories", input).await?;
        info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, or the API error.
    #[instrument(skip(self, input), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, AdminError> {
        input.validate()?;
        Ok(self
            .session()
            .put(&resource_path("categories", id.as_str()), input)
            .await?)
    }

    /// Show or hide a category on the storefront.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, category), fields(category_id = %category.id))]
    pub async fn set_category_visibility(
        &self,
        category: &Category,
        is_visible: bool,
    ) -> Result<Category, AdminError> {
        let input = CategoryInput {
            name: category.name.clone(),
            is_visible,
            image: category.image.clone(),
        };
        self.update_category(&category.id, &input).await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<(), AdminError> {
        self.session()
            .delete(&resource_path("categories", id.as_str()))
            .await?;
        info!("Category deleted");
        Ok(())
    }
}
