//! Product management.
//!
//! Products are sent as `multipart/form-data` so an image can ride along.
//! Localized fields are encoded as JSON text parts.

use quickpick_api::ApiError;
use quickpick_core::{CategoryId, LocalizedText, Money, Product, ProductId, ProductQuery};
use reqwest::Method;
use reqwest::multipart::Form;
use tracing::{info, instrument};

use crate::client::{AdminClient, resource_path, with_query};
use crate::error::AdminError;
use crate::upload::ImageUpload;

/// Fields for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub price: Money,
    pub stock: u32,
    pub category_id: Option<CategoryId>,
}

impl ProductInput {
    fn validate(&self) -> Result<(), AdminError> {
        if self.name.is_blank() {
            return Err(AdminError::validation("Product name is required"));
        }
        self.price
            .ensure_positive()
            .map_err(|e| AdminError::validation(format!("Price: {e}")))?;
        Ok(())
    }

    fn into_form(self, image: Option<ImageUpload>) -> Result<Form, AdminError> {
        let mut form = Form::new()
            .text("name", to_json(&self.name)?)
            .text("description", to_json(&self.description)?)
            .text("price", self.price.to_string())
            .text("stock", self.stock.to_string());
        if let Some(category) = self.category_id {
            form = form.text("category", category.into_inner());
        }
        if let Some(image) = image {
            form = form.part("image", image.into_part()?);
        }
        Ok(form)
    }
}

fn to_json(text: &LocalizedText) -> Result<String, AdminError> {
    serde_json::to_string(text).map_err(|e| AdminError::Api(ApiError::from(e)))
}

impl AdminClient {
    /// List products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, query: &ProductQuery) -> Result<Vec<Product>, AdminError> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Listing {
            List(Vec<Product>),
            Page { products: Vec<Product> },
        }

        let path = with_query("products", &product_filters(query));
        let listing: Listing = self.session().get(&path).await?;
        Ok(match listing {
            Listing::List(products) | Listing::Page { products } => products,
        })
    }

    /// Create a product, optionally with an image.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, or the API error.
    #[instrument(skip(self, input, image))]
    pub async fn create_product(
        &self,
        input: ProductInput,
        image: Option<ImageUpload>,
    ) -> Result<Product, AdminError> {
        input.validate()?;
        let form = input.into_form(image)?;
        let product: Product = self
            .session()
            .send_multipart(Method::POST, "products", form)
            .await?;
        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Update a product. Without an image the current one is kept.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, or the API error.
    #[instrument(skip(self, input, image), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        input: ProductInput,
        image: Option<ImageUpload>,
    ) -> Result<Product, AdminError> {
        input.validate()?;
        let form = input.into_form(image)?;
        Ok(self
            .session()
            .send_multipart(Method::PUT, &resource_path("products", id.as_str()), form)
            .await?)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), AdminError> {
        self.session()
            .delete(&resource_path("products", id.as_str()))
            .await?;
        info!("Product deleted");
        Ok(())
    }
}

fn product_filters(query: &ProductQuery) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(category) = &query.category {
        pairs.push(("category", category.to_string()));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        pairs.push(("search", search.to_owned()));
    }
    if let Some(page) = query.page {
        pairs.push(("page", page.to_string()));
    }
    if let Some(limit) = query.limit {
        pairs.push(("limit", limit.to_string()));
    }
    pairs
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            name: LocalizedText::plain("Oat milk"),
            description: LocalizedText::default(),
            price: Money::new(dec!(3.49)),
            stock: 12,
            category_id: Some(CategoryId::new("dairy")),
        }
    }

    #[test]
    fn test_validate() {
        assert!(input().validate().is_ok());
        let free = ProductInput {
            price: Money::ZERO,
            ..input()
        };
        assert!(free.validate().unwrap_err().to_string().starts_with("Price"));
        let nameless = ProductInput {
            name: LocalizedText::plain("  "),
            ..input()
        };
        assert!(nameless.validate().is_err());
    }

    #[test]
    fn test_into_form_with_image() {
        let image = ImageUpload::from_bytes("oat.png", vec![1, 2, 3]).unwrap();
        assert!(input().into_form(Some(image)).is_ok());
    }

    #[test]
    fn test_query_encoding() {
        assert_eq!(
            with_query("products", &product_filters(&ProductQuery::default())),
            "products"
        );
        let query = ProductQuery {
            category: Some(CategoryId::new("fruit")),
            search: Some(" red apple ".to_owned()),
            page: Some(2),
            limit: None,
        };
        assert_eq!(
            with_query("products", &product_filters(&query)),
            "products?category=fruit&search=red%20apple&page=2"
        );
    }
}
