//! Cart holder.
//!
//! The cart lives in memory only. Lines are keyed by product; adding a
//! product already in the cart merges quantities.

use std::sync::Arc;

use quickpick_core::{LocalizedText, Money, Product, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Errors from local cart edits.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("This product is out of stock")]
    OutOfStock { product_id: ProductId },
    #[error("Only {available} left in stock")]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
    },
    #[error("Quantity must be at least 1")]
    InvalidQuantity,
    #[error("This product is not in your cart")]
    NotInCart { product_id: ProductId },
}

impl CartError {
    /// Stable key for localizing the message.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self {
            Self::OutOfStock { .. } => "cart.out_of_stock",
            Self::InsufficientStock { .. } => "cart.insufficient_stock",
            Self::InvalidQuantity => "cart.invalid_quantity",
            Self::NotInCart { .. } => "cart.not_in_cart",
        }
    }
}

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: LocalizedText,
    pub unit_price: Money,
    pub quantity: u32,
    /// Stock reported when the product was added.
    pub available: u32,
}

impl CartLine {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// In-memory cart shared across the storefront.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Arc<RwLock<Vec<CartLine>>>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of a product, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Rejects a zero quantity, out-of-stock products, and totals above the
    /// product's reported stock.
    pub async fn add(&self, product: &Product, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if !product.in_stock() {
            return Err(CartError::OutOfStock {
                product_id: product.id.clone(),
            });
        }

        let mut lines = self.lines.write().await;
        let existing = lines
            .iter()
            .find(|l| l.product_id == product.id)
            .map_or(0, |l| l.quantity);
        let wanted = existing.saturating_add(quantity);
        if wanted > product.stock {
            return Err(CartError::InsufficientStock {
                product_id: product.id.clone(),
                available: product.stock,
            });
        }

        if let Some(line) = lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = wanted;
            line.unit_price = product.price;
            line.available = product.stock;
        } else {
            lines.push(CartLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                unit_price: product.price,
                quantity,
                available: product.stock,
            });
        }
        debug!(product_id = %product.id, quantity = wanted, "Cart line updated");
        Ok(())
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `NotInCart` for unknown products and `InsufficientStock` above
    /// the stock reported when the product was added.
    pub async fn set_quantity(&self, product_id: &ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(product_id).await;
        }
        let mut lines = self.lines.write().await;
        let line = lines
            .iter_mut()
            .find(|l| &l.product_id == product_id)
            .ok_or_else(|| CartError::NotInCart {
                product_id: product_id.clone(),
            })?;
        if quantity > line.available {
            return Err(CartError::InsufficientStock {
                product_id: product_id.clone(),
                available: line.available,
            });
        }
        line.quantity = quantity;
        Ok(())
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// Returns `NotInCart` if the product has no line.
    pub async fn remove(&self, product_id: &ProductId) -> Result<(), CartError> {
        let mut lines = self.lines.write().await;
        let before = lines.len();
        lines.retain(|l| &l.product_id != product_id);
        if lines.len() == before {
            return Err(CartError::NotInCart {
                product_id: product_id.clone(),
            });
        }
        Ok(())
    }

    /// Empty the cart.
    pub async fn clear(&self) {
        self.lines.write().await.clear();
    }

    /// Snapshot of all lines.
    pub async fn lines(&self) -> Vec<CartLine> {
        self.lines.read().await.clone()
    }

    /// Whether the cart has no lines.
    pub async fn is_empty(&self) -> bool {
        self.lines.read().await.is_empty()
    }

    /// Total units across all lines.
    pub async fn item_count(&self) -> u32 {
        self.lines.read().await.iter().map(|l| l.quantity).sum()
    }

    /// `Σ(unit_price × quantity)`.
    pub async fn subtotal(&self) -> Money {
        self.lines.read().await.iter().map(CartLine::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn product(id: &str, price: rust_decimal::Decimal, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: LocalizedText::plain(id),
            description: LocalizedText::default(),
            price: Money::new(price),
            stock,
            category_id: None,
            images: vec![],
        }
    }

    #[tokio::test]
    async fn test_add_merges_lines() {
        let cart = Cart::new();
        let milk = product("milk", dec!(1.25), 10);

        cart.add(&milk, 2).await.unwrap();
        cart.add(&milk, 3).await.unwrap();

        let lines = cart.lines().await;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);
        assert_eq!(cart.item_count().await, 5);
        assert_eq!(cart.subtotal().await, Money::new(dec!(6.25)));
    }

    #[tokio::test]
    async fn test_add_rejects_stock_problems() {
        let cart = Cart::new();
        assert_eq!(
            cart.add(&product("eggs", dec!(3), 0), 1).await,
            Err(CartError::OutOfStock {
                product_id: ProductId::new("eggs")
            })
        );

        let bread = product("bread", dec!(2), 2);
        cart.add(&bread, 2).await.unwrap();
        assert!(matches!(
            cart.add(&bread, 1).await,
            Err(CartError::InsufficientStock { available: 2, .. })
        ));
        assert_eq!(cart.add(&bread, 0).await, Err(CartError::InvalidQuantity));
    }

    #[tokio::test]
    async fn test_set_quantity_and_remove() {
        let cart = Cart::new();
        let rice = product("rice", dec!(4.5), 6);
        cart.add(&rice, 1).await.unwrap();

        cart.set_quantity(&rice.id, 4).await.unwrap();
        assert_eq!(cart.subtotal().await, Money::new(dec!(18)));

        assert!(cart.set_quantity(&rice.id, 7).await.is_err());

        cart.set_quantity(&rice.id, 0).await.unwrap();
        assert!(cart.is_empty().await);
        assert!(matches!(
            cart.remove(&rice.id).await,
            Err(CartError::NotInCart { .. })
        ));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let cart = Cart::new();
        let other = cart.clone();
        cart.add(&product("tea", dec!(2), 5), 1).await.unwrap();
        assert_eq!(other.item_count().await, 1);
        other.clear().await;
        assert!(cart.is_empty().await);
    }
}
