//! QuickPick back-office client.
//!
//! [`AdminClient`] signs in with an admin account and exposes typed calls for
//! categories, products, orders, users, promotions and CMS settings. Any 401
//! clears the admin session and surfaces as a redirect to `/admin/login`.
//!
//! # Security
//!
//! Customer accounts are refused at sign-in with [`AdminError::NotAdmin`];
//! the server still enforces every permission.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod categories;
pub mod client;
pub mod error;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod settings;
pub mod upload;
pub mod users;

pub use categories::CategoryInput;
pub use client::AdminClient;
pub use error::AdminError;
pub use orders::OrderFilter;
pub use products::ProductInput;
pub use promotions::PromotionInput;
pub use upload::ImageUpload;
pub use users::UserUpdate;
