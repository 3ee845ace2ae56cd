//! Promotion code management.

use chrono::{DateTime, Utc};
use quickpick_core::{Percentage, Promotion, PromotionId};
use serde::Serialize;
use tracing::{info, instrument};

use crate::client::{AdminClient, resource_path};
use crate::error::AdminError;

/// Fields for creating or updating a promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromotionInput {
    pub code: String,
    pub discount: Percentage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl PromotionInput {
    /// Validate and normalize the code.
    fn normalized(&self) -> Result<Self, AdminError> {
        let code = Promotion::normalize_code(&self.code);
        if code.is_empty() {
            return Err(AdminError::validation("Promo code is required"));
        }
        if code.chars().any(char::is_whitespace) {
            return Err(AdminError::validation("Promo code cannot contain spaces"));
        }
        if self.discount == Percentage::ZERO {
            return Err(AdminError::validation("Discount must be greater than 0%"));
        }
        Ok(Self {
            code,
            ..self.clone()
        })
    }
}

impl AdminClient {
    /// List promotions.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_promotions(&self) -> Result<Vec<Promotion>, AdminError> {
        Ok(self.session().get("promotions").await?)
    }

    /// Create a promotion.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, or the API error.
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create_promotion(&self, input: &PromotionInput) -> Result<Promotion, AdminError> {
        let input = input.normalized()?;
        let promotion: Promotion = self.session().post("promotions", &input).await?;
        info!(discount = %promotion.discount, "Promotion created");
        Ok(promotion)
    }

    /// Update a promotion.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, or the API error.
    #[instrument(skip(self, input), fields(promotion_id = %id))]
    pub async fn update_promotion(
        &self,
        id: &PromotionId,
        input: &PromotionInput,
    ) -> Result<Promotion, AdminError> {
        let input = input.normalized()?;
        Ok(self
            .session()
            .put(&resource_path("promotions", id.as_str()), &input)
            .await?)
    }

    /// Delete a promotion.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(promotion_id = %id))]
    pub async fn delete_promotion(&self, id: &PromotionId) -> Result<(), AdminError> {
        self.session()
            .delete(&resource_path("promotions", id.as_str()))
            .await?;
        info!("Promotion deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn input(code: &str, pct: rust_decimal::Decimal) -> PromotionInput {
        PromotionInput {
            code: code.to_owned(),
            discount: Percentage::new(pct).unwrap(),
            expires_at: None,
            is_active: true,
        }
    }

    #[test]
    fn test_normalized() {
        let ok = input(" ramadan15 ", dec!(15)).normalized().unwrap();
        assert_eq!(ok.code, "RAMADAN15");

        assert!(input("  ", dec!(15)).normalized().is_err());
        assert!(input("TWO WORDS", dec!(15)).normalized().is_err());
        assert_eq!(
            input("FREE", dec!(0)).normalized().unwrap_err().to_string(),
            "Discount must be greater than 0%"
        );
    }
}
