//! Idempotent seeding of categories and demonstration products.
//!
//! Both inserts skip conflicts. Categories skip on their unique name.
//! Products skip on any conflict: the `products_name_key` index dedups them
//! by name, and a clash on another key (a restored row holding the same id)
//! is skipped as well instead of aborting the run.
//!
//! Product categories are resolved by name after the category insert, so the
//! result does not depend on the order in which the categories were created.

use std::collections::HashMap;
use std::future::Future;

use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::{info, instrument, warn};

use papelaria_core::{CategoryId, Price, Stock};

use super::ProvisionError;
use super::catalog::Catalog;

/// A product ready for insertion, its category already resolved to an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub category_id: CategoryId,
    pub description: Option<String>,
    pub price: Price,
    pub stock: Stock,
    pub image_url: Option<String>,
}

/// Tables whose row counts are reported after seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountedTable {
    Categories,
    Products,
}

impl CountedTable {
    const fn count_sql(self) -> &'static str {
        match self {
            Self::Categories => "SELECT COUNT(*) FROM categories",
            Self::Products => "SELECT COUNT(*) FROM products",
        }
    }
}

/// Storage operations the seed job needs. Implemented for [`PgConnection`].
pub trait SeedStore {
    /// Insert category names, skipping existing ones. Returns rows inserted.
    fn insert_categories(
        &mut self,
        names: &[String],
    ) -> impl Future<Output = Result<u64, sqlx::Error>>;

    /// Look up ids for the given category names. Unknown names are absent.
    fn category_ids(
        &mut self,
        names: &[String],
    ) -> impl Future<Output = Result<HashMap<String, CategoryId>, sqlx::Error>>;

    /// Insert products, skipping any row that conflicts. Returns rows inserted.
    fn insert_products(
        &mut self,
        products: &[NewProduct],
    ) -> impl Future<Output = Result<u64, sqlx::Error>>;

    fn count_rows(
        &mut self,
        table: CountedTable,
    ) -> impl Future<Output = Result<i64, sqlx::Error>>;
}

impl SeedStore for PgConnection {
    async fn insert_categories(&mut self, names: &[String]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r"
            INSERT INTO categories (name)
            SELECT UNNEST($1::varchar[])
            ON CONFLICT (name) DO NOTHING
            ",
        )
        .bind(names)
        .execute(self)
        .await?;

        Ok(result.rows_affected())
    }

    async fn category_ids(
        &mut self,
        names: &[String],
    ) -> Result<HashMap<String, CategoryId>, sqlx::Error> {
        let rows: Vec<(CategoryId, String)> =
            sqlx::query_as("SELECT id, name FROM categories WHERE name = ANY($1)")
                .bind(names)
                .fetch_all(self)
                .await?;

        Ok(rows.into_iter().map(|(id, name)| (name, id)).collect())
    }

    async fn insert_products(&mut self, products: &[NewProduct]) -> Result<u64, sqlx::Error> {
        if products.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "INSERT INTO products (name, category_id, description, price, stock, image_url) ",
        );
        builder.push_values(products, |mut row, product| {
            row.push_bind(&product.name)
                .push_bind(product.category_id)
                .push_bind(&product.description)
                .push_bind(product.price)
                .push_bind(product.stock.get())
                .push_bind(&product.image_url);
        });
        builder.push(" ON CONFLICT DO NOTHING");

        let result = builder.build().execute(self).await?;
        Ok(result.rows_affected())
    }

    async fn count_rows(&mut self, table: CountedTable) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(table.count_sql()).fetch_one(self).await
    }
}

/// Outcome of a seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub categories_inserted: u64,
    pub products_inserted: u64,
    pub categories_total: i64,
    pub products_total: i64,
}

/// Seed `catalog` into `store`.
///
/// The catalog is validated before anything is written.
///
/// # Errors
///
/// - `ProvisionError::InvalidCatalog` if validation finds problems
/// - `ProvisionError::Statement` if any statement fails (for example when the
///   schema has not been initialized)
/// - `ProvisionError::UnknownCategory` if a product's category is not in the table
#[instrument(skip_all, fields(categories = catalog.categories.len(), products = catalog.products.len()))]
#[allow(clippy::future_not_send)]
pub async fn seed_catalog<S: SeedStore>(
    store: &mut S,
    catalog: &Catalog,
) -> Result<SeedReport, ProvisionError> {
    let issues = catalog.validate();
    if !issues.is_empty() {
        return Err(ProvisionError::InvalidCatalog(issues));
    }

    info!("Starting database seeding");

    let categories_inserted = store
        .insert_categories(&catalog.categories)
        .await
        .map_err(|source| ProvisionError::Statement {
            step: "insert categories",
            source,
        })?;
    info!(inserted = categories_inserted, "Categories inserted");

    let ids = store
        .category_ids(&catalog.categories)
        .await
        .map_err(|source| ProvisionError::Statement {
            step: "resolve categories",
            source,
        })?;

    let products = resolve_products(catalog, &ids)?;

    let products_inserted = store
        .insert_products(&products)
        .await
        .map_err(|source| ProvisionError::Statement {
            step: "insert products",
            source,
        })?;
    info!(inserted = products_inserted, "Products inserted");

    let skipped = (products.len() as u64).saturating_sub(products_inserted);
    if skipped > 0 {
        warn!(skipped, "Products already present were left unchanged");
    }

    let categories_total = store
        .count_rows(CountedTable::Categories)
        .await
        .map_err(|source| ProvisionError::Statement {
            step: "count categories",
            source,
        })?;
    let products_total = store
        .count_rows(CountedTable::Products)
        .await
        .map_err(|source| ProvisionError::Statement {
            step: "count products",
            source,
        })?;

    Ok(SeedReport {
        categories_inserted,
        products_inserted,
        categories_total,
        products_total,
    })
}

fn resolve_products(
    catalog: &Catalog,
    ids: &HashMap<String, CategoryId>,
) -> Result<Vec<NewProduct>, ProvisionError> {
    catalog
        .products
        .iter()
        .map(|product| {
            let category_id = *ids.get(&product.category).ok_or_else(|| {
                ProvisionError::UnknownCategory {
                    product: product.name.clone(),
                    category: product.category.clone(),
                }
            })?;
            let price = product
                .checked_price()
                .map_err(|issue| ProvisionError::InvalidCatalog(vec![issue]))?;
            let stock = product
                .checked_stock()
                .map_err(|issue| ProvisionError::InvalidCatalog(vec![issue]))?;

            Ok(NewProduct {
                name: product.name.clone(),
                category_id,
                description: product.description.clone(),
                price,
                stock,
                image_url: product.image_url.clone(),
            })
        })
        .collect()
}
