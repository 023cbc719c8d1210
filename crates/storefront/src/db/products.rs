//! Product repository (read side; products are written by the seed job).

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::PgPool;

use papelaria_core::{CategoryId, Price, ProductId, Stock};

use super::RepositoryError;
use crate::models::Product;

const PRODUCT_COLUMNS: &str =
    "id, name, category_id, description, price, stock, image_url, created_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    category_id: Option<CategoryId>,
    description: Option<String>,
    price: Decimal,
    stock: Option<i32>,
    image_url: Option<String>,
    created_at: Option<NaiveDateTime>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;
        let stock = Stock::new(row.stock.unwrap_or_default()).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid stock for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            category_id: row.category_id,
            description: row.description,
            price,
            stock,
            image_url: row.image_url,
            created_at: row.created_at,
        })
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row holds an invalid price or stock.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Products in one category, ordered by id.
    ///
    /// # Errors
    ///
    /// Same as [`Self::list`].
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category_id = $1 ORDER BY id"
        ))
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// # Errors
    ///
    /// Same as [`Self::list`].
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(Product::try_from).transpose()
    }

    /// # Errors
    ///
    /// Same as [`Self::list`].
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE name = $1"))
                .bind(name)
                .fetch_optional(self.pool)
                .await?;

        row.map(Product::try_from).transpose()
    }
}
