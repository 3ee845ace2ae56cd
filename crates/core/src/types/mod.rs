//! Core types for QuickPick.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod localized;
pub mod money;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use localized::{DEFAULT_LOCALE, LocalizedText};
pub use money::{Money, MoneyError, Percentage};
pub use status::*;
