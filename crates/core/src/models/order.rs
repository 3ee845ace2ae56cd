//! Orders and the blocks submitted with them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    LocalizedText, Money, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId,
};

/// A shipping address as captured at order time.
///
/// Saved addresses carry the same fields plus an id; orders keep a snapshot so
/// later edits to the address book do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub street: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ShippingAddress {
    /// Names of required fields that are blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("full_name", &self.full_name),
            ("phone", &self.phone),
            ("street", &self.street),
            ("city", &self.city),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// One-line rendering for summaries.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.street.as_str()];
        if let Some(building) = self.building.as_deref() {
            parts.push(building);
        }
        if let Some(area) = self.area.as_deref() {
            parts.push(area);
        }
        parts.push(self.city.as_str());
        parts.join(", ")
    }
}

/// Delivery timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// As soon as possible.
    #[default]
    Instant,
    /// At a chosen date and time slot.
    Scheduled,
}

/// The delivery block of an order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Delivery {
    #[serde(rename = "type", alias = "mode")]
    pub mode: DeliveryMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Time slot label, e.g. `"10:00-12:00"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl Delivery {
    /// Deliver as soon as possible.
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            mode: DeliveryMode::Instant,
            date: None,
            time: None,
            instructions: None,
        }
    }

    /// Deliver at a given date and time slot.
    #[must_use]
    pub fn scheduled(date: NaiveDate, time: impl Into<String>) -> Self {
        Self {
            mode: DeliveryMode::Scheduled,
            date: Some(date),
            time: Some(time.into()),
            instructions: None,
        }
    }

    /// Attach courier instructions.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        let instructions = instructions.into();
        self.instructions = (!instructions.trim().is_empty()).then_some(instructions);
        self
    }

    /// Whether a scheduled delivery has both its date and time slot.
    #[must_use]
    pub fn has_slot(&self) -> bool {
        match self.mode {
            DeliveryMode::Instant => true,
            DeliveryMode::Scheduled => {
                self.date.is_some() && self.time.as_deref().is_some_and(|t| !t.trim().is_empty())
            }
        }
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(alias = "product")]
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<LocalizedText>,
    pub quantity: u32,
    pub price: Money,
}

impl OrderItem {
    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

/// An order as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: OrderId,
    #[serde(default, alias = "user")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total: Money,
    #[serde(alias = "address")]
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub delivery: Option<Delivery>,
    #[serde(default)]
    pub promo_code: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Sara Ali".to_owned(),
            phone: "+201000000000".to_owned(),
            street: "12 Nile St".to_owned(),
            building: Some("Bldg 4".to_owned()),
            area: None,
            city: "Cairo".to_owned(),
            notes: None,
        }
    }

    #[test]
    fn test_missing_fields() {
        assert!(address().missing_fields().is_empty());

        let blank = ShippingAddress {
            phone: "  ".to_owned(),
            ..ShippingAddress::default()
        };
        assert_eq!(
            blank.missing_fields(),
            vec!["full_name", "phone", "street", "city"]
        );
    }

    #[test]
    fn test_one_line() {
        assert_eq!(address().one_line(), "12 Nile St, Bldg 4, Cairo");
    }

    #[test]
    fn test_delivery_slot_rules() {
        assert!(Delivery::instant().has_slot());

        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert!(Delivery::scheduled(date, "10:00-12:00").has_slot());

        let no_time = Delivery {
            mode: DeliveryMode::Scheduled,
            date: Some(date),
            time: Some(" ".to_owned()),
            instructions: None,
        };
        assert!(!no_time.has_slot());
    }

    #[test]
    fn test_delivery_serializes_type_field() {
        let json = serde_json::to_value(Delivery::instant().with_instructions("Ring twice")).unwrap();
        assert_eq!(json["type"], "instant");
        assert_eq!(json["instructions"], "Ring twice");
        assert!(json.get("date").is_none());
    }

    #[test]
    fn test_order_from_api_json() {
        let order: Order = serde_json::from_str(
            r#"{
                "_id": "o-1",
                "status": "processing",
                "payment_status": "paid",
                "payment_method": "wallet",
                "items": [{"product": "p1", "quantity": 2, "price": 10}],
                "total": 25.09,
                "address": {"full_name": "Sara", "phone": "1", "street": "s", "city": "c"}
            }"#,
        )
        .unwrap();

        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.unit_count(), 2);
        assert_eq!(order.items[0].line_total(), Money::new(dec!(20)));
        assert_eq!(order.total, Money::new(dec!(25.09)));
        assert!(order.delivery.is_none());
    }
}
