//! The signed-in customer's order history.

use quickpick_api::{ApiError, Session};
use quickpick_core::{Order, OrderId};
use tracing::{info, instrument};

fn order_path(id: &OrderId) -> String {
    format!("orders/{}", urlencoding::encode(id.as_str()))
}

/// Read and cancel the customer's own orders.
#[derive(Debug, Clone)]
pub struct Orders {
    session: Session,
}

impl Orders {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// `GET /orders/my`, newest first.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Order>, ApiError> {
        let mut orders: Vec<Order> = self.session.get("orders/my").await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// `GET /orders/{id}`.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get(&self, id: &OrderId) -> Result<Order, ApiError> {
        self.session.get(&order_path(id)).await
    }

    /// Ask the server to cancel an order.
    ///
    /// The server decides; a local check only avoids requests for orders
    /// already known to be past cancelling.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for orders already final, or the API
    /// error.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn cancel(&self, order: &Order) -> Result<Order, ApiError> {
        if !order.status.is_cancellable() {
            return Err(ApiError::Validation(format!(
                "Orders that are {} cannot be cancelled",
                order.status
            )));
        }
        let updated: Order = self
            .session
            .put(&format!("{}/cancel", order_path(&order.id)), &())
            .await?;
        info!(status = %updated.status, "Order cancellation requested");
        Ok(updated)
    }
}
