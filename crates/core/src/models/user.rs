//! Users and their embedded address book and saved cards.

use serde::{Deserialize, Serialize};

use super::order::ShippingAddress;
use crate::types::{AddressId, CardId, Email, Gender, Money, UserId};

/// A customer or back-office account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Free-text address from the profile form.
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, alias = "wallet", alias = "walletBalance")]
    pub wallet_balance: Money,
    #[serde(default, alias = "isAdmin")]
    pub is_admin: bool,
    #[serde(default)]
    pub cards: Vec<SavedCard>,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

/// A saved address in the user's address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(alias = "_id")]
    pub id: AddressId,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(flatten)]
    pub details: ShippingAddress,
    #[serde(default, alias = "isDefault")]
    pub is_default: bool,
}

/// A payment card saved on the server.
///
/// Only the processor token reference and display fields ever reach the
/// client; card numbers are never held or persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCard {
    #[serde(alias = "_id")]
    pub id: CardId,
    pub brand: String,
    pub last4: String,
    pub exp_month: u8,
    pub exp_year: u16,
    #[serde(default)]
    pub holder_name: Option<String>,
    #[serde(default, alias = "isDefault")]
    pub is_default: bool,
}

impl SavedCard {
    /// Masked label such as `Visa •••• 4242`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} •••• {}", self.brand, self.last4)
    }

    /// Whether the card has expired as of the given year and month.
    #[must_use]
    pub const fn is_expired(&self, year: u16, month: u8) -> bool {
        self.exp_year < year || (self.exp_year == year && self.exp_month < month)
    }
}

/// Request body for saving a card that was tokenized by the payment processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCard {
    pub token: String,
    pub brand: String,
    pub last4: String,
    pub exp_month: u8,
    pub exp_year: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_name: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_from_api_json() {
        let user: User = serde_json::from_str(
            r#"{
                "_id": "u1",
                "name": "Omar",
                "email": "omar@example.com",
                "wallet": 50,
                "isAdmin": true,
                "addresses": [{
                    "_id": "a1",
                    "label": "Home",
                    "full_name": "Omar",
                    "phone": "123",
                    "street": "1 Main",
                    "city": "Giza",
                    "isDefault": true
                }]
            }"#,
        )
        .unwrap();

        assert!(user.is_admin);
        assert_eq!(user.wallet_balance.to_string(), "50.00");
        assert_eq!(user.addresses[0].details.city, "Giza");
        assert!(user.addresses[0].is_default);
        assert!(user.cards.is_empty());
    }

    #[test]
    fn test_card_label_and_expiry() {
        let card = SavedCard {
            id: CardId::new("c1"),
            brand: "Visa".to_owned(),
            last4: "4242".to_owned(),
            exp_month: 6,
            exp_year: 2026,
            holder_name: None,
            is_default: false,
        };
        assert_eq!(card.label(), "Visa •••• 4242");
        assert!(!card.is_expired(2026, 6));
        assert!(card.is_expired(2026, 7));
        assert!(card.is_expired(2027, 1));
    }
}
