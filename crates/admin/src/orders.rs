//! Order management.

use quickpick_core::{Order, OrderId, OrderStatus, PaymentStatus};
use serde::Serialize;
use tracing::{info, instrument};

use crate::client::{AdminClient, resource_path, with_query};
use crate::error::AdminError;

/// Filters for the order list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub page: Option<u32>,
}

impl OrderFilter {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(payment_status) = self.payment_status {
            pairs.push(("payment_status", payment_status.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}

#[derive(Serialize)]
struct StatusBody {
    status: OrderStatus,
}

#[derive(Serialize)]
struct PaymentStatusBody {
    payment_status: PaymentStatus,
}

impl AdminClient {
    /// List orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, AdminError> {
        let mut orders: Vec<Order> = self
            .session()
            .get(&with_query("orders", &filter.pairs()))
            .await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, AdminError> {
        Ok(self
            .session()
            .get(&resource_path("orders", id.as_str()))
            .await?)
    }

    /// Move an order to a new fulfilment status.
    ///
    /// Final orders (delivered or cancelled) are not changed.
    ///
    /// # Errors
    ///
    /// Returns a validation error for final orders, or the API error.
    #[instrument(skip(self, order), fields(order_id = %order.id, from = %order.status))]
    pub async fn update_order_status(
        &self,
        order: &Order,
        status: OrderStatus,
    ) -> Result<Order, AdminError> {
        if order.status.is_final() && order.status != status {
            return Err(AdminError::validation(format!(
                "Order is already {} and cannot be changed",
                order.status
            )));
        }
        let path = format!("{}/status", resource_path("orders", order.id.as_str()));
        let updated: Order = self.session().put(&path, &StatusBody { status }).await?;
        info!(to = %updated.status, "Order status updated");
        Ok(updated)
    }

    /// Record a payment outcome for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn update_payment_status(
        &self,
        id: &OrderId,
        payment_status: PaymentStatus,
    ) -> Result<Order, AdminError> {
        let path = format!("{}/payment-status", resource_path("orders", id.as_str()));
        let updated: Order = self
            .session()
            .put(&path, &PaymentStatusBody { payment_status })
            .await?;
        info!(payment_status = %updated.payment_status, "Payment status updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_pairs() {
        assert!(OrderFilter::default().pairs().is_empty());
        let filter = OrderFilter {
            status: Some(OrderStatus::Shipped),
            payment_status: Some(PaymentStatus::Paid),
            page: Some(3),
        };
        assert_eq!(
            with_query("orders", &filter.pairs()),
            "orders?status=shipped&payment_status=paid&page=3"
        );
    }
}
