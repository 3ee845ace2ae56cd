//! Products and categories.

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, LocalizedText, Money, ProductId};

/// A product on sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    pub price: Money,
    /// Units in stock as last reported by the server.
    #[serde(default)]
    pub stock: u32,
    #[serde(default, alias = "category")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Whether at least one unit is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// First image URL, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: CategoryId,
    pub name: LocalizedText,
    #[serde(default = "default_visible", alias = "visible", alias = "isVisible")]
    pub is_visible: bool,
    #[serde(default)]
    pub image: Option<String>,
}

const fn default_visible() -> bool {
    true
}

/// Filters for listing products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Stable key for caching list results.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "products:{}:{}:{}:{}",
            self.category.as_ref().map_or("", CategoryId::as_str),
            self.search.as_deref().unwrap_or(""),
            self.page.unwrap_or(1),
            self.limit.unwrap_or(0),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_api_json() {
        let product: Product = serde_json::from_str(
            r#"{
                "_id": "p1",
                "name": {"en": "Apples", "ar": "تفاح"},
                "price": 3.5,
                "stock": 12,
                "category": "fruit",
                "images": ["/img/apples.jpg"]
            }"#,
        )
        .unwrap();

        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.name.get("ar"), "تفاح");
        assert_eq!(product.category_id, Some(CategoryId::new("fruit")));
        assert!(product.in_stock());
        assert_eq!(product.primary_image(), Some("/img/apples.jpg"));
        assert!(product.description.is_blank());
    }

    #[test]
    fn test_category_visibility_defaults_true() {
        let category: Category = serde_json::from_str(r#"{"id": 3, "name": "Dairy"}"#).unwrap();
        assert!(category.is_visible);
        assert_eq!(category.id.as_str(), "3");

        let hidden: Category =
            serde_json::from_str(r#"{"id": "c", "name": "X", "visible": false}"#).unwrap();
        assert!(!hidden.is_visible);
    }

    #[test]
    fn test_product_query_cache_key() {
        let query = ProductQuery {
            category: Some(CategoryId::new("veg")),
            search: Some("tom".to_owned()),
            page: None,
            limit: None,
        };
        assert_eq!(query.cache_key(), "products:veg:tom:1:0");
        assert_eq!(ProductQuery::default().cache_key(), "products:::1:0");
    }
}
