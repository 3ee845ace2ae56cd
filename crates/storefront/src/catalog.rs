//! Public catalog reads.
//!
//! Categories and products are cached using `moka` (5-minute TTL). Search
//! results are never cached.

use std::time::Duration;

use moka::future::Cache;
use quickpick_api::{ApiClient, ApiError};
use quickpick_core::{Category, CategoryId, Product, ProductId, ProductQuery};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300);

/// A page of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: u32,
    /// Total pages, when the server reports it.
    pub pages: Option<u32>,
    /// Total matching products, when the server reports it.
    pub total: Option<u64>,
}

/// The products endpoint answers with either a bare array or a page object.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProductsResponse {
    List(Vec<Product>),
    Page {
        products: Vec<Product>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default, alias = "totalPages")]
        pages: Option<u32>,
        #[serde(default)]
        total: Option<u64>,
    },
}

impl ProductsResponse {
    fn into_page(self, requested: Option<u32>) -> ProductPage {
        match self {
            Self::List(products) => ProductPage {
                products,
                page: requested.unwrap_or(1),
                pages: None,
                total: None,
            },
            Self::Page {
                products,
                page,
                pages,
                total,
            } => ProductPage {
                products,
                page: page.or(requested).unwrap_or(1),
                pages,
                total,
            },
        }
    }
}

#[derive(Debug, Clone)]
enum CacheValue {
    Categories(Vec<Category>),
    Category(Box<Category>),
    Products(ProductPage),
    Product(Box<Product>),
}

/// Read-only access to categories and products.
///
/// Cheaply cloneable; clones share the cache.
#[derive(Clone)]
pub struct Catalog {
    client: ApiClient,
    cache: Cache<String, CacheValue>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("client", &self.client)
            .field("cached_entries", &self.cache.entry_count())
            .finish()
    }
}

impl Catalog {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();
        Self { client, cache }
    }

    /// Visible categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let cache_key = "categories".to_owned();
        if let Some(CacheValue::Categories(categories)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.client.get("categories").await?;
        let visible: Vec<Category> = categories.into_iter().filter(|c| c.is_visible).collect();

        self.cache
            .insert(cache_key, CacheValue::Categories(visible.clone()))
            .await;
        Ok(visible)
    }

    /// A single category. Hidden categories are reported as not found.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown or hidden categories.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        let cache_key = format!("category:{id}");
        if let Some(CacheValue::Category(category)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let category: Category = self
            .client
            .get(&format!("categories/{}", urlencoding::encode(id.as_str())))
            .await?;
        if !category.is_visible {
            return Err(ApiError::NotFound(format!("Category not found: {id}")));
        }

        self.cache
            .insert(cache_key, CacheValue::Category(Box::new(category.clone())))
            .await;
        Ok(category)
    }

    /// List products, optionally filtered by category and search text.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let searching = query.search.as_deref().is_some_and(|s| !s.trim().is_empty());
        let cache_key = query.cache_key();

        if !searching
            && let Some(CacheValue::Products(page)) = self.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let response: ProductsResponse = self.client.get_with_query("products", query).await?;
        let page = response.into_page(query.page);

        if !searching {
            self.cache
                .insert(cache_key, CacheValue::Products(page.clone()))
                .await;
        }
        Ok(page)
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{id}");
        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .client
            .get(&format!("products/{}", urlencoding::encode(id.as_str())))
            .await?;

        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Drop all cached entries.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}
