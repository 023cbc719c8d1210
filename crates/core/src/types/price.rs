//! Exact monetary amounts in Brazilian reais.
//!
//! Prices are persisted as `NUMERIC(10,2)`, so a valid [`Price`] is
//! non-negative, has at most two decimal places and at most eight integer
//! digits. Floating point never touches an amount.

use core::fmt;
use core::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::quantity::Quantity;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
    /// The amount has more than two decimal places.
    #[error("price must have at most 2 decimal places: {0}")]
    TooPrecise(Decimal),
    /// The amount does not fit `NUMERIC(10,2)`.
    #[error("price exceeds the maximum of {max}: {value}", max = Price::MAX)]
    TooLarge {
        /// The rejected amount.
        value: Decimal,
    },
}

/// A non-negative amount with exactly two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Largest amount representable by `NUMERIC(10,2)`.
    pub const MAX: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

    /// Zero reais.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, has more than two decimal
    /// places, or exceeds [`Self::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount.normalize().scale() > 2 {
            return Err(PriceError::TooPrecise(amount));
        }
        if amount > Self::MAX {
            return Err(PriceError::TooLarge { value: amount });
        }

        let mut amount = amount;
        amount.rescale(2);
        Ok(Self(amount))
    }

    /// Create a price from a whole number of centavos.
    ///
    /// # Errors
    ///
    /// Returns an error if `cents` is negative or too large for `NUMERIC(10,2)`.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// The exact decimal amount (scale 2).
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply a unit price by a quantity, as for an order line subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::TooLarge`] if the result does not fit `NUMERIC(10,2)`.
    pub fn times(&self, quantity: Quantity) -> Result<Self, PriceError> {
        let value = self
            .0
            .checked_mul(Decimal::from(quantity.get()))
            .ok_or(PriceError::TooLarge { value: Self::MAX })?;
        Self::new(value)
    }

    /// Add two prices, failing if the sum leaves the column range.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::TooLarge`] if the sum exceeds [`Self::MAX`].
    pub fn checked_add(&self, other: Self) -> Result<Self, PriceError> {
        let value = self
            .0
            .checked_add(other.0)
            .ok_or(PriceError::TooLarge { value: Self::MAX })?;
        Self::new(value)
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// Sums exactly; the result may exceed the column range, so callers that
/// persist a total should re-validate it with [`Price::new`].
impl Sum<Price> for Decimal {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, price| acc + price.0)
    }
}

/// Formats as Brazilian currency, e.g. `R$ 1.234,50`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fixed = format!("{:.2}", self.0);
        let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(digit);
        }

        write!(f, "R$ {grouped},{cents}")
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_from_cents_is_exact() {
        let price = Price::from_cents(2490).unwrap();
        assert_eq!(price.amount(), dec("24.90"));
        assert_eq!(price.amount().scale(), 2);
    }

    #[test]
    fn test_new_rescales_whole_numbers() {
        let price = Price::new(dec("12")).unwrap();
        assert_eq!(price.amount().to_string(), "12.00");
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(Price::new(dec("-0.01")), Err(PriceError::Negative(_))));
        assert!(matches!(Price::new(dec("1.005")), Err(PriceError::TooPrecise(_))));
        assert!(matches!(
            Price::new(dec("100000000.00")),
            Err(PriceError::TooLarge { .. })
        ));
        assert!(Price::new(dec("99999999.99")).is_ok());
        assert!(Price::new(dec("1.500")).is_ok());
    }

    #[test]
    fn test_max_matches_column() {
        assert_eq!(Price::MAX, dec("99999999.99"));
    }

    #[test]
    fn test_times_quantity() {
        let unit = Price::from_cents(890).unwrap();
        let subtotal = unit.times(Quantity::new(3).unwrap()).unwrap();
        assert_eq!(subtotal.amount(), dec("26.70"));
    }

    #[test]
    fn test_sum_into_decimal() {
        let total: Decimal = [2490, 1290, 450]
            .into_iter()
            .map(|c| Price::from_cents(c).unwrap())
            .sum();
        assert_eq!(total, dec("42.30"));
    }

    #[test]
    fn test_display_brazilian_format() {
        assert_eq!(Price::from_cents(2490).unwrap().to_string(), "R$ 24,90");
        assert_eq!(Price::from_cents(450).unwrap().to_string(), "R$ 4,50");
        assert_eq!(Price::from_cents(123_450).unwrap().to_string(), "R$ 1.234,50");
        assert_eq!(Price::ZERO.to_string(), "R$ 0,00");
    }

    #[test]
    fn test_serde_validates() {
        let price: Price = serde_json::from_str("\"34.90\"").unwrap();
        assert_eq!(price, Price::from_cents(3490).unwrap());
        assert!(serde_json::from_str::<Price>("\"-1\"").is_err());
    }
}
