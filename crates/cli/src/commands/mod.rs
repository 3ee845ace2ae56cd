//! Subcommand implementations.

pub mod admin;
pub mod shop;

use quickpick_api::Route;
use thiserror::Error;

/// Errors raised by the CLI itself, before or around API calls.
#[derive(Debug, Error)]
pub enum CliError {
    /// No usable session for the command.
    #[error("Not signed in. Run `{command}` first.")]
    SignedOut { command: &'static str },

    /// A `--item` argument was not `PRODUCT_ID[:QUANTITY]`.
    #[error("Invalid item {0:?}: expected PRODUCT_ID[:QUANTITY]")]
    InvalidItem(String),
}

impl CliError {
    /// The sign-in command matching a login route.
    pub const fn signed_out(route: &Route) -> Self {
        match route {
            Route::AdminLogin => Self::SignedOut {
                command: "qp admin login",
            },
            _ => Self::SignedOut {
                command: "qp login",
            },
        }
    }
}
