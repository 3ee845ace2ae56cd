//! Checkout submission.
//!
//! Validation runs entirely locally and short-circuits on the first problem,
//! in this order:
//!
//! 1. cart not empty
//! 2. shipping address chosen
//! 3. payment method chosen
//! 4. a saved card chosen, when paying by card
//! 5. date and time slot set, for scheduled delivery
//! 6. wallet balance covers the discounted total, when paying from the wallet
//!
//! Only then is anything sent. Wallet payments are debited locally before
//! `POST /orders` and credited back if the order is rejected.

use quickpick_api::{ApiError, Route, Session};
use quickpick_core::{
    AddressId, CardId, CheckoutTotals, Delivery, Money, Order, PaymentMethod, Percentage,
    ProductId, ShippingAddress,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::addresses::Addresses;
use crate::cart::{Cart, CartLine};
use crate::promotions::AppliedPromotion;
use crate::wallet::{Wallet, WalletError};

/// Checkout errors.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Please select a shipping address")]
    AddressRequired,

    #[error("Please complete the address: {}", fields.join(", "))]
    IncompleteAddress { fields: Vec<&'static str> },

    #[error("Please select a payment method")]
    PaymentMethodRequired,

    #[error("Please select a card")]
    CardRequired,

    #[error("Please choose a delivery date and time")]
    DeliverySlotRequired,

    #[error("Insufficient wallet balance: {balance} available, {required} required")]
    InsufficientBalance { balance: Money, required: Money },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CheckoutError {
    /// Stable key for localizing the message.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self {
            Self::EmptyCart => "checkout.empty_cart",
            Self::AddressRequired => "checkout.address_required",
            Self::IncompleteAddress { .. } => "checkout.incomplete_address",
            Self::PaymentMethodRequired => "checkout.payment_method_required",
            Self::CardRequired => "checkout.card_required",
            Self::DeliverySlotRequired => "checkout.delivery_slot_required",
            Self::InsufficientBalance { .. } => "checkout.insufficient_balance",
            Self::Api(_) => "checkout.order_failed",
        }
    }

    /// Where to send the user, if the session was rejected.
    #[must_use]
    pub const fn redirect(&self) -> Option<&Route> {
        match self {
            Self::Api(e) => e.redirect(),
            _ => None,
        }
    }
}

impl From<WalletError> for CheckoutError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::InsufficientBalance { balance, required } => {
                Self::InsufficientBalance { balance, required }
            }
            WalletError::InvalidAmount(e) => Self::Api(ApiError::Validation(e.to_string())),
            WalletError::Api(e) => Self::Api(e),
        }
    }
}

/// Which address to ship to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressChoice {
    /// An address from the loaded address book.
    Saved(AddressId),
    /// An address typed in on the checkout page.
    New(ShippingAddress),
}

/// Everything the checkout page collects.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub address: Option<AddressChoice>,
    pub delivery: Delivery,
    pub payment: Option<PaymentMethod>,
    pub card: Option<CardId>,
    pub promotion: Option<AppliedPromotion>,
}

impl CheckoutForm {
    /// Discount from the applied promotion, zero when none.
    #[must_use]
    pub fn discount(&self) -> Percentage {
        self.promotion
            .as_ref()
            .map_or(Percentage::ZERO, |p| p.discount)
    }
}

/// A fully validated order, ready to send.
#[derive(Debug, Clone)]
pub struct ValidatedOrder {
    pub lines: Vec<CartLine>,
    pub totals: CheckoutTotals,
    pub payment: PaymentMethod,
    pub card: Option<CardId>,
    pub address_id: Option<AddressId>,
    pub shipping_address: ShippingAddress,
    pub delivery: Delivery,
    pub promo_code: Option<String>,
}

#[derive(Debug, Serialize)]
struct OrderLineBody<'a> {
    product_id: &'a ProductId,
    quantity: u32,
    price: Money,
}

#[derive(Debug, Serialize)]
struct OrderRequest<'a> {
    items: Vec<OrderLineBody<'a>>,
    total: Money,
    payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    card_id: Option<&'a CardId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address_id: Option<&'a AddressId>,
    shipping_address: &'a ShippingAddress,
    delivery: &'a Delivery,
    #[serde(skip_serializing_if = "Option::is_none")]
    promo_code: Option<&'a str>,
}

impl<'a> From<&'a ValidatedOrder> for OrderRequest<'a> {
    fn from(order: &'a ValidatedOrder) -> Self {
        Self {
            items: order
                .lines
                .iter()
                .map(|l| OrderLineBody {
                    product_id: &l.product_id,
                    quantity: l.quantity,
                    price: l.unit_price,
                })
                .collect(),
            total: order.totals.discounted_total,
            payment_method: order.payment,
            card_id: order.card.as_ref(),
            address_id: order.address_id.as_ref(),
            shipping_address: &order.shipping_address,
            delivery: &order.delivery,
            promo_code: order.promo_code.as_deref(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OrderResponse {
    Wrapped { order: Box<Order> },
    Bare(Box<Order>),
}

impl From<OrderResponse> for Box<Order> {
    fn from(response: OrderResponse) -> Self {
        match response {
            OrderResponse::Wrapped { order } | OrderResponse::Bare(order) => order,
        }
    }
}

/// Checkout flow over the shared cart, wallet and address book.
#[derive(Debug, Clone)]
pub struct Checkout {
    session: Session,
    cart: Cart,
    wallet: Wallet,
    addresses: Addresses,
}

impl Checkout {
    #[must_use]
    pub const fn new(session: Session, cart: Cart, wallet: Wallet, addresses: Addresses) -> Self {
        Self {
            session,
            cart,
            wallet,
            addresses,
        }
    }

    /// Totals for the current cart under the form's payment method and
    /// promotion.
    pub async fn summary(&self, form: &CheckoutForm) -> CheckoutTotals {
        let lines = self.cart.lines().await;
        CheckoutTotals::compute(
            lines.iter().map(|l| (l.unit_price, l.quantity)),
            form.payment,
            form.discount(),
        )
    }

    /// Run every local check. No request is sent.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub async fn validate(&self, form: &CheckoutForm) -> Result<ValidatedOrder, CheckoutError> {
        let lines = self.cart.lines().await;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let (address_id, shipping_address) = match &form.address {
            None => return Err(CheckoutError::AddressRequired),
            Some(AddressChoice::Saved(id)) => {
                let saved = self
                    .addresses
                    .find(id)
                    .await
                    .ok_or(CheckoutError::AddressRequired)?;
                (Some(saved.id), saved.details)
            }
            Some(AddressChoice::New(address)) => {
                let fields = address.missing_fields();
                if !fields.is_empty() {
                    return Err(CheckoutError::IncompleteAddress { fields });
                }
                (None, address.clone())
            }
        };

        let payment = form.payment.ok_or(CheckoutError::PaymentMethodRequired)?;

        let card = match payment {
            PaymentMethod::Card => Some(form.card.clone().ok_or(CheckoutError::CardRequired)?),
            PaymentMethod::Wallet | PaymentMethod::Cash => None,
        };

        if !form.delivery.has_slot() {
            return Err(CheckoutError::DeliverySlotRequired);
        }

        let totals = CheckoutTotals::compute(
            lines.iter().map(|l| (l.unit_price, l.quantity)),
            Some(payment),
            form.discount(),
        );

        if payment == PaymentMethod::Wallet {
            let balance = self.wallet.balance().await;
            if balance < totals.discounted_total {
                return Err(CheckoutError::InsufficientBalance {
                    balance,
                    required: totals.discounted_total,
                });
            }
        }

        Ok(ValidatedOrder {
            lines,
            totals,
            payment,
            card,
            address_id,
            shipping_address,
            delivery: form.delivery.clone(),
            promo_code: form.promotion.as_ref().map(|p| p.code.clone()),
        })
    }

    /// Validate and place the order.
    ///
    /// On success the cart is cleared and the confirmation route carries the
    /// server's order.
    ///
    /// # Errors
    ///
    /// Returns a validation error without sending anything, or the server's
    /// rejection (after reverting any wallet debit).
    #[instrument(skip(self, form))]
    pub async fn submit(&self, form: &CheckoutForm) -> Result<Route, CheckoutError> {
        let order = self.validate(form).await?;
        let amount = order.totals.discounted_total;
        let pays_from_wallet = order.payment == PaymentMethod::Wallet;
        // A fully discounted order leaves nothing to take from the wallet.
        let debits_wallet = pays_from_wallet && amount > Money::ZERO;

        if debits_wallet {
            self.wallet.debit(amount).await?;
        }

        let placed: Result<OrderResponse, ApiError> = self
            .session
            .post("orders", &OrderRequest::from(&order))
            .await;

        let placed: Box<Order> = match placed {
            Ok(response) => response.into(),
            Err(e) => {
                if debits_wallet {
                    self.wallet.credit_back(amount).await;
                }
                return Err(e.into());
            }
        };

        self.cart.clear().await;
        info!(
            order_id = %placed.id,
            total = %amount,
            payment = %order.payment,
            "Order placed"
        );

        if pays_from_wallet && let Err(e) = self.wallet.refresh().await {
            warn!(error = %e, "Failed to re-sync wallet balance after order");
        }

        Ok(Route::OrderConfirmation(placed))
    }
}
