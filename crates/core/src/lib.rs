//! QuickPick Core - Shared types library.
//!
//! This crate provides common types used across all QuickPick client components:
//! - `api` - HTTP transport and session handling
//! - `storefront` - Customer-facing cart, wallet, and checkout
//! - `admin` - Back-office catalog, order, and content management
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, statuses, and localized text
//! - [`models`] - Server-owned records (users, products, orders, promotions, settings)
//! - [`pricing`] - Checkout total computation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod pricing;
pub mod types;

pub use models::*;
pub use pricing::{CASH_ON_DELIVERY_FEE, CheckoutTotals, SHIPPING_FEE};
pub use types::*;
