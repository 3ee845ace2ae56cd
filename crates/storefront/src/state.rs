//! Storefront state shared across screens.

use std::sync::Arc;

use quickpick_api::{
    ApiClient, ApiConfig, ApiError, AuthScope, Credentials, FileSessionStore, Restored, Route,
    Session, SessionStore, SignupForm,
};
use quickpick_core::User;
use tracing::{info, warn};

use crate::account::Account;
use crate::addresses::Addresses;
use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::checkout::Checkout;
use crate::content::Content;
use crate::orders::Orders;
use crate::payment_methods::PaymentMethods;
use crate::promotions::Promotions;
use crate::wallet::Wallet;

/// Every storefront holder, wired to one session.
///
/// This struct is cheaply cloneable via `Arc`; clones share all state.
#[derive(Debug, Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

#[derive(Debug)]
struct StorefrontInner {
    config: ApiConfig,
    session: Session,
    cart: Cart,
    wallet: Wallet,
    addresses: Addresses,
    payment_methods: PaymentMethods,
    catalog: Catalog,
    promotions: Promotions,
    orders: Orders,
    account: Account,
    content: Content,
}

impl Storefront {
    /// Build the storefront with a file-backed session at
    /// `config.session_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let store = Arc::new(FileSessionStore::new(&config.session_path));
        Self::with_store(config, store)
    }

    /// Build the storefront with a custom session store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_store(config: ApiConfig, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let client = ApiClient::new(&config)?;
        let session = Session::new(client.clone(), store, AuthScope::Storefront);

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                cart: Cart::new(),
                wallet: Wallet::new(session.clone()),
                addresses: Addresses::new(session.clone()),
                payment_methods: PaymentMethods::new(session.clone()),
                catalog: Catalog::new(client.clone()),
                promotions: Promotions::new(session.clone()),
                orders: Orders::new(session.clone()),
                account: Account::new(session.clone()),
                content: Content::new(client),
                session,
                config,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.inner.cart
    }

    #[must_use]
    pub fn wallet(&self) -> &Wallet {
        &self.inner.wallet
    }

    #[must_use]
    pub fn addresses(&self) -> &Addresses {
        &self.inner.addresses
    }

    #[must_use]
    pub fn payment_methods(&self) -> &PaymentMethods {
        &self.inner.payment_methods
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn promotions(&self) -> &Promotions {
        &self.inner.promotions
    }

    #[must_use]
    pub fn orders(&self) -> &Orders {
        &self.inner.orders
    }

    #[must_use]
    pub fn account(&self) -> &Account {
        &self.inner.account
    }

    #[must_use]
    pub fn content(&self) -> &Content {
        &self.inner.content
    }

    /// Checkout over this storefront's cart, wallet and address book.
    #[must_use]
    pub fn checkout(&self) -> Checkout {
        Checkout::new(
            self.inner.session.clone(),
            self.inner.cart.clone(),
            self.inner.wallet.clone(),
            self.inner.addresses.clone(),
        )
    }

    /// Re-validate any persisted session and seed the wallet from it.
    pub async fn start(&self) -> Restored {
        let restored = self.inner.session.restore().await;
        match &restored {
            Restored::Active(user) => self.signed_in(user).await,
            Restored::SignedOut(_) => self.reset_holders().await,
        }
        restored
    }

    /// Sign in and seed the wallet.
    ///
    /// # Errors
    ///
    /// Returns the server's rejection or a session store error.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let user = self.inner.session.login(credentials).await?;
        self.signed_in(&user).await;
        Ok(user)
    }

    /// Register, sign in and seed the wallet.
    ///
    /// # Errors
    ///
    /// Returns a validation error, the server's rejection, or a store error.
    pub async fn signup(&self, form: &SignupForm) -> Result<User, ApiError> {
        let user = self.inner.session.signup(form).await?;
        self.signed_in(&user).await;
        Ok(user)
    }

    /// Sign out and forget per-user state. The cart is kept.
    pub async fn logout(&self) -> Route {
        let route = self.inner.session.logout().await;
        self.reset_holders().await;
        route
    }

    async fn signed_in(&self, user: &User) {
        self.inner.wallet.seed(user.wallet_balance).await;
        if let Err(e) = self.inner.wallet.refresh().await {
            warn!(error = %e, "Using wallet balance from user payload");
        }
        info!(user_id = %user.id, "Storefront ready");
    }

    async fn reset_holders(&self) {
        self.inner.wallet.reset().await;
        self.inner.addresses.reset().await;
        self.inner.payment_methods.reset().await;
    }
}
