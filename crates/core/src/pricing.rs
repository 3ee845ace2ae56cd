//! Checkout total computation.
//!
//! ```text
//! subtotal          = Σ(price_i × qty_i)
//! total             = subtotal + shipping (+ cash fee iff paying cash)
//! discounted_total  = round_cents(total × (1 − discount/100))
//! ```
//!
//! The discount applies to the whole total, shipping and cash fee included.

use serde::Serialize;

use crate::types::{Money, Percentage, PaymentMethod};

/// Flat delivery fee added to every order.
pub const SHIPPING_FEE: Money = Money::from_cents(489);

/// Handling fee added when paying cash on delivery.
pub const CASH_ON_DELIVERY_FEE: Money = Money::from_cents(299);

/// Breakdown of an order's price as shown on the checkout summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub cash_fee: Money,
    pub total: Money,
    pub discount: Percentage,
    pub discounted_total: Money,
}

impl CheckoutTotals {
    /// Compute totals for `(unit_price, quantity)` lines.
    ///
    /// `payment` may be `None` while the customer has not picked a method yet;
    /// the cash fee is only added once cash is selected.
    #[must_use]
    pub fn compute<I>(lines: I, payment: Option<PaymentMethod>, discount: Percentage) -> Self
    where
        I: IntoIterator<Item = (Money, u32)>,
    {
        let subtotal: Money = lines.into_iter().map(|(price, qty)| price * qty).sum();
        let cash_fee = if payment == Some(PaymentMethod::Cash) {
            CASH_ON_DELIVERY_FEE
        } else {
            Money::ZERO
        };
        let total = subtotal + SHIPPING_FEE + cash_fee;
        let discounted_total = total.discounted_by(discount).round_cents();

        Self {
            subtotal,
            shipping: SHIPPING_FEE,
            cash_fee,
            total,
            discount,
            discounted_total,
        }
    }

    /// Amount taken off by the discount.
    #[must_use]
    pub fn savings(&self) -> Money {
        self.total - self.discounted_total
    }
}
