//! Type-safe money representation using decimal arithmetic.
//!
//! The QuickPick API exchanges amounts as JSON numbers in the store currency.
//! [`Money`] keeps them as [`Decimal`] on the client so that cart and checkout
//! sums are exact, and writes them back as plain numbers.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when building a [`Money`] or [`Percentage`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input could not be parsed as a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),
    /// The amount must be strictly greater than zero.
    #[error("amount must be greater than zero")]
    NotPositive,
    /// The amount cannot be negative.
    #[error("amount cannot be negative")]
    Negative,
    /// A percentage was outside `0..=100`.
    #[error("percentage must be between 0 and 100 (got {0})")]
    PercentageOutOfRange(Decimal),
}

/// An amount of money in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build an amount from an integer number of cents.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_cents(cents: i64) -> Self {
        let magnitude = cents.unsigned_abs();
        Self(Decimal::from_parts(
            magnitude as u32,
            (magnitude >> 32) as u32,
            0,
            cents < 0,
            2,
        ))
    }

    /// Parse a user-entered amount that must be strictly positive.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Invalid`] for unparseable input and
    /// [`MoneyError::NotPositive`] for zero or negative amounts.
    pub fn parse_positive(s: &str) -> Result<Self, MoneyError> {
        let money: Self = s.parse()?;
        money.ensure_positive()
    }

    /// Return `self` if strictly positive.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::NotPositive`] for zero or negative amounts.
    pub fn ensure_positive(self) -> Result<Self, MoneyError> {
        if self.0 > Decimal::ZERO {
            Ok(self)
        } else {
            Err(MoneyError::NotPositive)
        }
    }

    /// Return `self` if zero or positive.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] for negative amounts.
    pub fn ensure_non_negative(self) -> Result<Self, MoneyError> {
        if self.0.is_sign_negative() && !self.0.is_zero() {
            Err(MoneyError::Negative)
        } else {
            Ok(self)
        }
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Round to cents, midpoint away from zero.
    #[must_use]
    pub fn round_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Apply a percentage discount: `self × (1 − pct/100)`, unrounded.
    #[must_use]
    pub fn discounted_by(self, pct: Percentage) -> Self {
        Self(self.0 * (Decimal::ONE - pct.as_fraction()))
    }

    /// Subtract, returning `None` if the result would be negative.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        let diff = self.0 - other.0;
        if diff.is_sign_negative() && !diff.is_zero() {
            None
        } else {
            Some(Self(diff))
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.round_cents().0)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Self)
            .map_err(|_| MoneyError::Invalid(s.to_owned()))
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, qty: u32) -> Self {
        Self(self.0 * Decimal::from(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

// The API speaks JSON numbers, so amounts go out as f64 after rounding to cents.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.round_cents().0.to_f64().unwrap_or_default();
        serializer.serialize_f64(value)
    }
}

struct DecimalVisitor;

impl Visitor<'_> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
        // f64 Display gives the shortest representation that round-trips,
        // so 4.89 becomes exactly 4.89 rather than its binary expansion.
        Decimal::from_str(&v.to_string()).map_err(|_| E::custom(format!("invalid amount {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        Decimal::from_str(v.trim()).map_err(|_| E::custom(format!("invalid amount {v:?}")))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DecimalVisitor).map(Self)
    }
}

/// A discount percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percentage(Decimal);

impl Percentage {
    /// No discount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Build a percentage, rejecting values outside `0..=100`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::PercentageOutOfRange`].
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(MoneyError::PercentageOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// The percentage value (e.g. `10` for 10%).
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// The percentage as a fraction (e.g. `0.1` for 10%).
    #[must_use]
    pub fn as_fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

/// Parses `10`, `12.5` or `10%`.
impl FromStr for Percentage {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
        let value = Decimal::from_str(number).map_err(|_| MoneyError::Invalid(s.to_owned()))?;
        Self::new(value)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0.to_f64().unwrap_or_default())
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = deserializer.deserialize_any(DecimalVisitor)?;
        Self::new(value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_from_cents() {
        assert_eq!(Money::from_cents(489), Money::new(dec!(4.89)));
        assert_eq!(Money::from_cents(-250), Money::new(dec!(-2.50)));
        assert_eq!(Money::from_cents(0), Money::ZERO);
        // Wider than 32 bits, so the middle word is in play.
        assert_eq!(
            Money::from_cents(12_345_678_901_234),
            Money::new(dec!(123456789012.34))
        );
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(
            Money::parse_positive("12.5").unwrap(),
            Money::new(dec!(12.5))
        );
        assert_eq!(Money::parse_positive("0"), Err(MoneyError::NotPositive));
        assert_eq!(Money::parse_positive("-3"), Err(MoneyError::NotPositive));
        assert!(matches!(
            Money::parse_positive("ten"),
            Err(MoneyError::Invalid(_))
        ));
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Money::new(dec!(25.092)).to_string(), "25.09");
        assert_eq!(Money::new(dec!(0.125)).to_string(), "0.13");
        assert_eq!(Money::new(dec!(7)).to_string(), "7.00");
    }

    #[test]
    fn test_checked_sub() {
        let ten = Money::new(dec!(10));
        assert_eq!(ten.checked_sub(Money::new(dec!(4))), Some(Money::new(dec!(6))));
        assert_eq!(ten.checked_sub(ten), Some(Money::ZERO));
        assert_eq!(ten.checked_sub(Money::new(dec!(10.01))), None);
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let a: Money = serde_json::from_str("4.89").unwrap();
        let b: Money = serde_json::from_str("\"4.89\"").unwrap();
        let c: Money = serde_json::from_str("20").unwrap();
        assert_eq!(a, Money::new(dec!(4.89)));
        assert_eq!(a, b);
        assert_eq!(c, Money::new(dec!(20)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&Money::new(dec!(27.88))).unwrap();
        assert_eq!(json, "27.88");
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(Percentage::new(dec!(0)).is_ok());
        assert!(Percentage::new(dec!(100)).is_ok());
        assert!(Percentage::new(dec!(-1)).is_err());
        assert!(Percentage::new(dec!(100.5)).is_err());
        assert!(serde_json::from_str::<Percentage>("150").is_err());
    }

    #[test]
    fn test_percentage_from_str() {
        assert_eq!("10".parse::<Percentage>().unwrap().value(), dec!(10));
        assert_eq!("12.5%".parse::<Percentage>().unwrap().value(), dec!(12.5));
        assert!("abc".parse::<Percentage>().is_err());
        assert!("150".parse::<Percentage>().is_err());
    }

    #[test]
    fn test_discounted_by() {
        let pct = Percentage::new(dec!(10)).unwrap();
        assert_eq!(
            Money::new(dec!(27.88)).discounted_by(pct),
            Money::new(dec!(25.092))
        );
    }
}
