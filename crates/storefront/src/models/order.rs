//! Order domain types.
//!
//! An order's `total` must equal the sum of its line subtotals. The database
//! does not enforce this; [`OrderRepository::create`] computes the total from
//! the lines and [`Order::total_matches`] checks stored data.
//!
//! [`OrderRepository::create`]: crate::db::OrderRepository::create

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use papelaria_core::{OrderId, OrderItemId, Price, PriceError, ProductId, Quantity, UserId};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub total: Price,
    /// Set once the external WhatsApp notification has been sent.
    pub whatsapp_sent: bool,
    pub created_at: Option<NaiveDateTime>,
}

impl Order {
    /// Whether `total` equals the sum of the given lines' subtotals.
    #[must_use]
    pub fn total_matches(&self, items: &[OrderItem]) -> bool {
        let subtotals: Result<Vec<Price>, PriceError> =
            items.iter().map(OrderItem::subtotal).collect();
        subtotals.is_ok_and(|prices| prices.into_iter().sum::<Decimal>() == self.total.amount())
    }
}

/// One line of an order. `unit_price` is the price when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: Option<OrderId>,
    pub product_id: Option<ProductId>,
    pub quantity: Quantity,
    pub unit_price: Price,
}

impl OrderItem {
    /// `unit_price × quantity`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::TooLarge` if the subtotal exceeds `NUMERIC(10,2)`.
    pub fn subtotal(&self) -> Result<Price, PriceError> {
        self.unit_price.times(self.quantity)
    }
}

/// A line to add to a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub unit_price: Price,
}

impl NewOrderItem {
    /// # Errors
    ///
    /// Returns `PriceError::TooLarge` if the subtotal exceeds `NUMERIC(10,2)`.
    pub fn subtotal(&self) -> Result<Price, PriceError> {
        self.unit_price.times(self.quantity)
    }
}

/// Sum of the lines' subtotals.
///
/// # Errors
///
/// Returns `PriceError::TooLarge` if any subtotal or the total exceeds `NUMERIC(10,2)`.
pub fn order_total(items: &[NewOrderItem]) -> Result<Price, PriceError> {
    items
        .iter()
        .try_fold(Price::ZERO, |total, item| total.checked_add(item.subtotal()?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn line(product: i32, quantity: i32, cents: i64) -> NewOrderItem {
        NewOrderItem {
            product_id: ProductId::new(product),
            quantity: Quantity::new(quantity).unwrap(),
            unit_price: Price::from_cents(cents).unwrap(),
        }
    }

    #[test]
    fn test_order_total_sums_subtotals() {
        let items = [line(1, 2, 2490), line(7, 3, 890)];
        assert_eq!(order_total(&items).unwrap(), Price::from_cents(7650).unwrap());
        assert_eq!(order_total(&[]).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_order_total_overflow() {
        let items = [line(1, 2, 5_000_000_000)];
        assert!(matches!(order_total(&items), Err(PriceError::TooLarge { .. })));
    }

    #[test]
    fn test_total_matches() {
        let order_id = OrderId::new(Uuid::new_v4());
        let items = vec![
            OrderItem {
                id: OrderItemId::new(1),
                order_id: Some(order_id),
                product_id: Some(ProductId::new(3)),
                quantity: Quantity::new(1).unwrap(),
                unit_price: Price::from_cents(8990).unwrap(),
            },
            OrderItem {
                id: OrderItemId::new(2),
                order_id: Some(order_id),
                product_id: Some(ProductId::new(15)),
                quantity: Quantity::new(4).unwrap(),
                unit_price: Price::from_cents(350).unwrap(),
            },
        ];
        let mut order = Order {
            id: order_id,
            user_id: None,
            total: Price::from_cents(10390).unwrap(),
            whatsapp_sent: false,
            created_at: None,
        };
        assert!(order.total_matches(&items));

        order.total = Price::from_cents(10391).unwrap();
        assert!(!order.total_matches(&items));
    }
}
