//! Integer counts: order line quantities and product stock levels.

use serde::{Deserialize, Serialize};

/// Errors for [`Quantity`] and [`Stock`] construction.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// An order line quantity must be at least one.
    #[error("quantity must be positive, got {0}")]
    NotPositive(i32),
    /// Stock cannot go below zero.
    #[error("stock cannot be negative, got {0}")]
    NegativeStock(i32),
}

/// Number of units on an order line. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// # Errors
    ///
    /// Returns [`QuantityError::NotPositive`] for zero or negative values.
    pub const fn new(value: i32) -> Result<Self, QuantityError> {
        if value <= 0 {
            return Err(QuantityError::NotPositive(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

/// Units of a product on hand. Defaults to zero, like `products.stock`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i32", into = "i32")]
pub struct Stock(i32);

impl Stock {
    /// # Errors
    ///
    /// Returns [`QuantityError::NegativeStock`] for values below zero.
    pub const fn new(value: i32) -> Result<Self, QuantityError> {
        if value < 0 {
            return Err(QuantityError::NegativeStock(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Stock {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Stock> for i32 {
    fn from(stock: Stock) -> Self {
        stock.0
    }
}
