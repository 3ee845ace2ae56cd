//! Navigation targets.
//!
//! Operations that end on another screen return a [`Route`] instead of
//! navigating themselves, so any front end (CLI, TUI, web) can decide how to
//! present it.

use quickpick_core::Order;

/// Where the user should land next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    /// Customer sign-in screen.
    Login,
    /// Back-office sign-in screen.
    AdminLogin,
    AdminDashboard,
    Cart,
    Checkout,
    /// Confirmation screen carrying the order the server created.
    OrderConfirmation(Box<Order>),
    Orders,
    Wallet,
}

impl Route {
    /// URL path of the screen.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::AdminLogin => "/admin/login",
            Self::AdminDashboard => "/admin",
            Self::Cart => "/cart",
            Self::Checkout => "/checkout",
            Self::OrderConfirmation(_) => "/order-confirmation",
            Self::Orders => "/orders",
            Self::Wallet => "/wallet",
        }
    }
}

/// Which sign-in screen an expired session sends the user back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuthScope {
    #[default]
    Storefront,
    Admin,
}

impl AuthScope {
    /// Sign-in route for this scope.
    #[must_use]
    pub const fn login_route(self) -> Route {
        match self {
            Self::Storefront => Route::Login,
            Self::Admin => Route::AdminLogin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_routes() {
        assert_eq!(AuthScope::Storefront.login_route().path(), "/login");
        assert_eq!(AuthScope::Admin.login_route().path(), "/admin/login");
    }
}
