//! Promotion codes applied on the cart page.

use chrono::{DateTime, Utc};
use quickpick_api::{ApiError, Session};
use quickpick_core::{Percentage, Promotion};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

/// Promotion errors.
#[derive(Debug, Error)]
pub enum PromotionError {
    #[error("Please enter a promo code")]
    EmptyCode,

    #[error("This promo code is no longer active")]
    Inactive { code: String },

    #[error("This promo code has expired")]
    Expired { code: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl PromotionError {
    /// Stable key for localizing the message.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self {
            Self::EmptyCode => "promotion.empty_code",
            Self::Inactive { .. } => "promotion.inactive",
            Self::Expired { .. } => "promotion.expired",
            Self::Api(_) => "promotion.invalid",
        }
    }
}

/// A validated code and its discount, carried from the cart into checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPromotion {
    pub code: String,
    pub discount: Percentage,
}

#[derive(Serialize)]
struct ValidateBody<'a> {
    code: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ValidateResponse {
    Wrapped { promotion: Promotion },
    Bare(Promotion),
}

impl From<ValidateResponse> for Promotion {
    fn from(response: ValidateResponse) -> Self {
        match response {
            ValidateResponse::Wrapped { promotion } | ValidateResponse::Bare(promotion) => {
                promotion
            }
        }
    }
}

/// Check a promotion the server returned.
fn accept(promotion: Promotion, now: DateTime<Utc>) -> Result<AppliedPromotion, PromotionError> {
    if !promotion.is_active {
        return Err(PromotionError::Inactive {
            code: promotion.code,
        });
    }
    if promotion.is_expired_at(now) {
        return Err(PromotionError::Expired {
            code: promotion.code,
        });
    }
    Ok(AppliedPromotion {
        code: Promotion::normalize_code(&promotion.code),
        discount: promotion.discount,
    })
}

/// Validates promotion codes.
#[derive(Debug, Clone)]
pub struct Promotions {
    session: Session,
}

impl Promotions {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Validate a code through `POST /promotions/validate`.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCode` without a request, the server's rejection, or
    /// `Inactive`/`Expired` if the returned promotion is unusable.
    #[instrument(skip(self))]
    pub async fn apply(&self, code: &str) -> Result<AppliedPromotion, PromotionError> {
        let code = Promotion::normalize_code(code);
        if code.is_empty() {
            return Err(PromotionError::EmptyCode);
        }
        let response: ValidateResponse = self
            .session
            .post("promotions/validate", &ValidateBody { code: &code })
            .await?;
        let applied = accept(response.into(), Utc::now())?;
        info!(code = %applied.code, discount = %applied.discount, "Promotion applied");
        Ok(applied)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;

    fn promo(active: bool, expires: Option<DateTime<Utc>>) -> Promotion {
        Promotion {
            id: None,
            code: "save10".to_owned(),
            discount: Percentage::new(dec!(10)).unwrap(),
            expires_at: expires,
            is_active: active,
        }
    }

    #[test]
    fn test_accept() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

        let applied = accept(promo(true, None), now).unwrap();
        assert_eq!(applied.code, "SAVE10");
        assert_eq!(applied.discount.value(), dec!(10));

        assert!(matches!(
            accept(promo(false, None), now),
            Err(PromotionError::Inactive { .. })
        ));

        let yesterday = Utc.with_ymd_and_hms(2025, 2, 28, 23, 59, 59).unwrap();
        let err = accept(promo(true, Some(yesterday)), now).unwrap_err();
        assert_eq!(err.message_key(), "promotion.expired");
    }

    #[test]
    fn test_validate_response_shapes() {
        let bare: ValidateResponse =
            serde_json::from_str(r#"{"code": "A", "discount": 5}"#).unwrap();
        assert_eq!(Promotion::from(bare).code, "A");

        let wrapped: ValidateResponse = serde_json::from_str(
            r#"{"valid": true, "promotion": {"code": "B", "discountPercentage": 15}}"#,
        )
        .unwrap();
        assert_eq!(Promotion::from(wrapped).discount.value(), dec!(15));
    }

    #[tokio::test]
    async fn test_empty_code_sends_nothing() {
        use std::sync::Arc;

        use quickpick_api::{ApiClient, ApiConfig, AuthScope, MemorySessionStore};

        let config = ApiConfig::for_base_url("http://127.0.0.1:9").unwrap();
        let promotions = Promotions::new(Session::new(
            ApiClient::new(&config).unwrap(),
            Arc::new(MemorySessionStore::new()),
            AuthScope::Storefront,
        ));
        assert!(matches!(
            promotions.apply("   ").await,
            Err(PromotionError::EmptyCode)
        ));
    }
}
