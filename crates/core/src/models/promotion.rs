//! Promotion codes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Percentage, PromotionId};

/// A percentage-off promotion code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<PromotionId>,
    pub code: String,
    #[serde(alias = "discount_percentage", alias = "discountPercentage")]
    pub discount: Percentage,
    #[serde(
        default,
        alias = "expiration_date",
        alias = "expirationDate",
        deserialize_with = "super::timestamp::deserialize_opt"
    )]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active", alias = "active", alias = "isActive")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl Promotion {
    /// Normalize user input the way codes are stored: trimmed, uppercase.
    #[must_use]
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Whether the expiry (if any) is in the past.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry < now)
    }

    /// Active and not expired.
    #[must_use]
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_bare_date_expires_end_of_day() {
        let promo: Promotion = serde_json::from_str(
            r#"{"code": "SAVE10", "discount": 10, "expiration_date": "2026-05-01"}"#,
        )
        .unwrap();

        assert_eq!(promo.discount.value(), dec!(10));
        assert!(promo.is_active);

        let same_day = Utc.with_ymd_and_hms(2026, 5, 1, 18, 0, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2026, 5, 2, 0, 0, 1).unwrap();
        assert!(promo.is_usable_at(same_day));
        assert!(!promo.is_usable_at(next_day));
    }

    #[test]
    fn test_rfc3339_expiry_and_inactive() {
        let promo: Promotion = serde_json::from_str(
            r#"{"code": "X", "discount_percentage": 5, "expirationDate": "2026-01-01T00:00:00.000Z", "active": false}"#,
        )
        .unwrap();
        let before = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
        assert!(!promo.is_expired_at(before));
        assert!(!promo.is_usable_at(before));
    }

    #[test]
    fn test_no_expiry() {
        let promo: Promotion = serde_json::from_str(r#"{"code": "X", "discount": 5}"#).unwrap();
        assert!(promo.expires_at.is_none());
        assert!(promo.is_usable_at(Utc::now()));
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(Promotion::normalize_code("  save10 "), "SAVE10");
    }
}
