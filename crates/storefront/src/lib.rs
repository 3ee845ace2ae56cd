//! QuickPick storefront - customer-side state and checkout.
//!
//! Each holder is a cheaply cloneable handle over shared state, built once by
//! [`Storefront`] and mutated only through its methods:
//!
//! - [`Cart`]: in-memory line items
//! - [`Wallet`]: server balance mirror with local debits for order payment
//! - [`Addresses`] and [`PaymentMethods`]: address book and saved cards
//! - [`Catalog`]: cached category and product reads
//! - [`Checkout`]: validation, totals, and order submission
//!
//! Operations return a [`quickpick_api::Route`] where the front end should
//! navigate next, and errors render through [`quickpick_api::Notice`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod addresses;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod content;
pub mod orders;
pub mod payment_methods;
pub mod promotions;
pub mod state;
pub mod wallet;

pub use account::{Account, PasswordChange, ProfileUpdate};
pub use addresses::{Addresses, NewAddress};
pub use cart::{Cart, CartError, CartLine};
pub use catalog::{Catalog, ProductPage};
pub use checkout::{AddressChoice, Checkout, CheckoutError, CheckoutForm, ValidatedOrder};
pub use content::Content;
pub use orders::Orders;
pub use payment_methods::PaymentMethods;
pub use promotions::{AppliedPromotion, PromotionError, Promotions};
pub use state::Storefront;
pub use wallet::{Wallet, WalletError};
