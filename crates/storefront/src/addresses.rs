//! Address book holder.

use std::sync::Arc;

use quickpick_api::{ApiError, Session};
use quickpick_core::{Address, AddressId, ShippingAddress};
use serde::Serialize;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::instrument;

#[derive(Debug, Default)]
struct AddressBook {
    generation: u64,
    addresses: Vec<Address>,
    selected: Option<AddressId>,
}

impl AddressBook {
    fn at(generation: u64) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }
}

/// Body for `POST /user/addresses`.
#[derive(Debug, Clone, Serialize)]
pub struct NewAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub details: ShippingAddress,
    pub is_default: bool,
}

/// The signed-in user's saved addresses and the one picked for checkout.
///
/// Cheaply cloneable; clones share state.
#[derive(Debug, Clone)]
pub struct Addresses {
    session: Session,
    book: Arc<RwLock<AddressBook>>,
}

impl Addresses {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session,
            book: Arc::new(RwLock::new(AddressBook::default())),
        }
    }

    /// Fetch the address book. Selects the default address if nothing valid
    /// is selected yet.
    ///
    /// # Errors
    ///
    /// Returns the API error; cached addresses are left unchanged.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Vec<Address>, ApiError> {
        let addresses: Vec<Address> = self.session.get("user/addresses").await?;
        let mut book = self.current().await;
        let still_there = book
            .selected
            .as_ref()
            .is_some_and(|id| addresses.iter().any(|a| &a.id == id));
        if !still_there {
            book.selected = addresses.iter().find(|a| a.is_default).map(|a| a.id.clone());
        }
        book.addresses.clone_from(&addresses);
        Ok(addresses)
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` naming blank required fields before any
    /// request, or the API error.
    #[instrument(skip(self, address))]
    pub async fn add(&self, address: &NewAddress) -> Result<Address, ApiError> {
        let missing = address.details.missing_fields();
        if !missing.is_empty() {
            return Err(ApiError::Validation(format!(
                "Missing address fields: {}",
                missing.join(", ")
            )));
        }
        let created: Address = self.session.post("user/addresses", address).await?;
        let mut book = self.current().await;
        if created.is_default {
            for existing in &mut book.addresses {
                existing.is_default = false;
            }
        }
        book.addresses.push(created.clone());
        Ok(created)
    }

    /// Delete a saved address.
    ///
    /// # Errors
    ///
    /// Returns the API error; the cached address is kept.
    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn remove(&self, id: &AddressId) -> Result<(), ApiError> {
        self.session
            .delete(&format!("user/addresses/{}", urlencoding::encode(id.as_str())))
            .await?;
        let mut book = self.current().await;
        book.addresses.retain(|a| &a.id != id);
        if book.selected.as_ref() == Some(id) {
            book.selected = None;
        }
        Ok(())
    }

    /// Pick a saved address for checkout.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the address is not in the loaded book.
    pub async fn select(&self, id: &AddressId) -> Result<(), ApiError> {
        let mut book = self.current().await;
        if !book.addresses.iter().any(|a| &a.id == id) {
            return Err(ApiError::NotFound(format!("address {id}")));
        }
        book.selected = Some(id.clone());
        Ok(())
    }

    /// The address picked for checkout.
    pub async fn selected(&self) -> Option<Address> {
        let book = self.current().await;
        let id = book.selected.as_ref()?;
        book.addresses.iter().find(|a| &a.id == id).cloned()
    }

    /// Look up a loaded address.
    pub async fn find(&self, id: &AddressId) -> Option<Address> {
        self.current()
            .await
            .addresses
            .iter()
            .find(|a| &a.id == id)
            .cloned()
    }

    /// Addresses as last loaded.
    pub async fn all(&self) -> Vec<Address> {
        self.current().await.addresses.clone()
    }

    /// Forget everything, on sign-out.
    pub async fn reset(&self) {
        *self.book.write().await = AddressBook::at(self.session.generation());
    }

    /// The book for the current sign-in; anything loaded before the session
    /// was last cleared is dropped first.
    async fn current(&self) -> RwLockWriteGuard<'_, AddressBook> {
        let generation = self.session.generation();
        let mut book = self.book.write().await;
        if book.generation != generation {
            *book = AddressBook::at(generation);
        }
        book
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quickpick_api::{ApiClient, ApiConfig, AuthScope, MemorySessionStore};

    use super::*;

    fn addresses() -> Addresses {
        let config = ApiConfig::for_base_url("http://127.0.0.1:9").unwrap();
        Addresses::new(Session::new(
            ApiClient::new(&config).unwrap(),
            Arc::new(MemorySessionStore::new()),
            AuthScope::Storefront,
        ))
    }

    #[tokio::test]
    async fn test_add_validates_before_request() {
        let err = addresses()
            .add(&NewAddress {
                label: None,
                details: ShippingAddress {
                    full_name: "Nour".to_owned(),
                    ..ShippingAddress::default()
                },
                is_default: false,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing address fields: phone, street, city");
    }

    #[tokio::test]
    async fn test_select_unknown_address() {
        let holder = addresses();
        assert!(matches!(
            holder.select(&AddressId::new("nope")).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(holder.selected().await.is_none());
    }

    #[test]
    fn test_new_address_body_is_flat() {
        let body = serde_json::to_value(NewAddress {
            label: Some("Work".to_owned()),
            details: ShippingAddress {
                full_name: "Nour".to_owned(),
                phone: "010".to_owned(),
                street: "9 Nile St".to_owned(),
                city: "Cairo".to_owned(),
                ..ShippingAddress::default()
            },
            is_default: true,
        })
        .unwrap();
        assert_eq!(body["label"], "Work");
        assert_eq!(body["street"], "9 Nile St");
        assert_eq!(body["is_default"], true);
        assert!(body.get("details").is_none());
    }
}
