//! Server-owned records the client displays and edits.
//!
//! Field names follow the API's snake_case JSON. Identifiers also accept the
//! `_id` spelling, and optional collections default to empty when absent.

pub mod catalog;
pub mod content;
pub mod order;
pub mod promotion;
pub mod user;
pub mod wallet;

pub use catalog::{Category, Product, ProductQuery};
pub use content::CmsSetting;
pub use order::{Delivery, DeliveryMode, Order, OrderItem, ShippingAddress};
pub use promotion::Promotion;
pub use user::{Address, NewCard, SavedCard, User};
pub use wallet::{TransactionKind, WalletBalance, WalletTransaction};

/// Lenient timestamp parsing for API dates.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer};

    /// Parse RFC 3339 timestamps or bare `YYYY-MM-DD` dates.
    ///
    /// A bare date means the end of that day (UTC), which is how promotion
    /// expiry dates are entered in the back office.
    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {s}"))),
        }
    }
}
