//! Category and product domain types.

use chrono::NaiveDateTime;

use papelaria_core::{CategoryId, Price, ProductId, Stock};

/// A product category. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// `None` when uncategorized, including after its category was deleted.
    pub category_id: Option<CategoryId>,
    pub description: Option<String>,
    pub price: Price,
    pub stock: Stock,
    pub image_url: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}
