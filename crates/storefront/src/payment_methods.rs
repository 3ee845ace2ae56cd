//! Saved payment cards.
//!
//! Cards are tokenized by the payment processor before they reach this code;
//! only the token, brand, last four digits and expiry are sent to the API.
//! Nothing card-related is written to the session store.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use quickpick_api::{ApiError, Session};
use quickpick_core::{CardId, NewCard, SavedCard};
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::instrument;

#[derive(Debug, Default)]
struct CardBook {
    generation: u64,
    cards: Vec<SavedCard>,
    selected: Option<CardId>,
}

impl CardBook {
    fn at(generation: u64) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }
}

fn validate(card: &NewCard) -> Result<(), ApiError> {
    if card.token.trim().is_empty() {
        return Err(ApiError::Validation("Card token is required".to_owned()));
    }
    if card.last4.len() != 4 || !card.last4.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::Validation(
            "Card last4 must be four digits".to_owned(),
        ));
    }
    if !(1..=12).contains(&card.exp_month) {
        return Err(ApiError::Validation(
            "Card expiry month must be between 1 and 12".to_owned(),
        ));
    }
    let now = Utc::now();
    let (year, month) = (now.year(), now.month());
    let expired = i32::from(card.exp_year) < year
        || (i32::from(card.exp_year) == year && u32::from(card.exp_month) < month);
    if expired {
        return Err(ApiError::Validation("Card has expired".to_owned()));
    }
    Ok(())
}

/// The signed-in user's saved cards and the one picked for checkout.
///
/// Cheaply cloneable; clones share state.
#[derive(Debug, Clone)]
pub struct PaymentMethods {
    session: Session,
    book: Arc<RwLock<CardBook>>,
}

impl PaymentMethods {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session,
            book: Arc::new(RwLock::new(CardBook::default())),
        }
    }

    /// Fetch saved cards, selecting the default one if nothing is selected.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Vec<SavedCard>, ApiError> {
        let cards: Vec<SavedCard> = self.session.get("user/cards").await?;
        let mut book = self.current().await;
        let still_there = book
            .selected
            .as_ref()
            .is_some_and(|id| cards.iter().any(|c| &c.id == id));
        if !still_there {
            book.selected = cards.iter().find(|c| c.is_default).map(|c| c.id.clone());
        }
        book.cards.clone_from(&cards);
        Ok(cards)
    }

    /// Save a processor-tokenized card.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` before any request for a blank token,
    /// malformed last4, or a bad or past expiry; otherwise the API error.
    #[instrument(skip(self, card), fields(brand = %card.brand, last4 = %card.last4))]
    pub async fn add(&self, card: &NewCard) -> Result<SavedCard, ApiError> {
        validate(card)?;
        let saved: SavedCard = self.session.post("user/cards", card).await?;
        self.current().await.cards.push(saved.clone());
        Ok(saved)
    }

    /// Delete a saved card.
    ///
    /// # Errors
    ///
    /// Returns the API error.
    #[instrument(skip(self), fields(card_id = %id))]
    pub async fn remove(&self, id: &CardId) -> Result<(), ApiError> {
        self.session
            .delete(&format!("user/cards/{}", urlencoding::encode(id.as_str())))
            .await?;
        let mut book = self.current().await;
        book.cards.retain(|c| &c.id != id);
        if book.selected.as_ref() == Some(id) {
            book.selected = None;
        }
        Ok(())
    }

    /// Pick a saved card for checkout.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the card is not loaded.
    pub async fn select(&self, id: &CardId) -> Result<(), ApiError> {
        let mut book = self.current().await;
        if !book.cards.iter().any(|c| &c.id == id) {
            return Err(ApiError::NotFound(format!("card {id}")));
        }
        book.selected = Some(id.clone());
        Ok(())
    }

    /// The card picked for checkout.
    pub async fn selected(&self) -> Option<SavedCard> {
        let book = self.current().await;
        let id = book.selected.as_ref()?;
        book.cards.iter().find(|c| &c.id == id).cloned()
    }

    /// Cards as last loaded.
    pub async fn all(&self) -> Vec<SavedCard> {
        self.current().await.cards.clone()
    }

    /// Forget everything, on sign-out.
    pub async fn reset(&self) {
        *self.book.write().await = CardBook::at(self.session.generation());
    }

    /// The book for the current sign-in; anything loaded before the session
    /// was last cleared is dropped first.
    async fn current(&self) -> RwLockWriteGuard<'_, CardBook> {
        let generation = self.session.generation();
        let mut book = self.book.write().await;
        if book.generation != generation {
            *book = CardBook::at(generation);
        }
        book
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn card() -> NewCard {
        NewCard {
            token: "tok_visa".to_owned(),
            brand: "Visa".to_owned(),
            last4: "4242".to_owned(),
            exp_month: 12,
            exp_year: 2099,
            holder_name: None,
        }
    }

    #[test]
    fn test_validate() {
        assert!(validate(&card()).is_ok());

        let blank = NewCard {
            token: " ".to_owned(),
            ..card()
        };
        assert_eq!(
            validate(&blank).unwrap_err().to_string(),
            "Card token is required"
        );

        let bad_last4 = NewCard {
            last4: "42a2".to_owned(),
            ..card()
        };
        assert!(validate(&bad_last4).is_err());

        let bad_month = NewCard {
            exp_month: 13,
            ..card()
        };
        assert!(validate(&bad_month).is_err());

        let expired = NewCard {
            exp_year: 2001,
            ..card()
        };
        assert_eq!(validate(&expired).unwrap_err().to_string(), "Card has expired");
    }

    #[test]
    fn test_new_card_body_has_no_number() {
        let body = serde_json::to_value(card()).unwrap();
        assert_eq!(body["token"], "tok_visa");
        assert!(body.get("number").is_none());
        assert!(body.get("holder_name").is_none());
    }
}
