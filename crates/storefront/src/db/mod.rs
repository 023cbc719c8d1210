//! Database operations for the storefront `PostgreSQL`.
//!
//! ## Tables
//!
//! - `users` - Customer and admin accounts
//! - `categories` - Product categories (unique names)
//! - `products` - Catalog, optionally linked to a category
//! - `orders` - Customer orders with the notification flag
//! - `order_items` - Order lines, deleted with their order
//! - `session` - Web session store, swept by expiry
//!
//! # Provisioning
//!
//! The tables are created by [`schema::initialize_schema`] and populated by
//! [`seed::seed_catalog`], both run through the CLI:
//! ```bash
//! papelaria setup
//! papelaria seed
//! ```

pub mod catalog;
pub mod categories;
pub mod orders;
pub mod products;
pub mod schema;
pub mod seed;
pub mod sessions;
pub mod users;

use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgConnection, PgPool, Postgres};
use thiserror::Error;

use crate::config::{ConfigError, DatabaseConfig};

pub use catalog::{Catalog, CatalogError, CatalogIssue};
pub use categories::CategoryRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use sessions::SessionRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Input rejected before reaching the database.
    #[error("validation failed: {0}")]
    Validation(String),
}

/// Errors from the schema and seed jobs.
///
/// Every variant is fatal: the job stops at the first one and the caller
/// exits non-zero. Statements that already ran are not rolled back.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Environment configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No database connection could be established.
    #[error("could not connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    /// A schema or seed statement failed; `step` names it.
    #[error("statement '{step}' failed: {source}")]
    Statement {
        step: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A product's category name did not resolve to a row.
    #[error("product '{product}' references unknown category '{category}'")]
    UnknownCategory { product: String, category: String },

    /// The catalog failed validation; nothing was written.
    #[error("catalog has {} problem(s): {}", .0.len(), summarize(.0))]
    InvalidCatalog(Vec<CatalogIssue>),

    /// The catalog file could not be read or parsed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

fn summarize(issues: &[CatalogIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One pooled connection owned by a batch job.
///
/// Opened explicitly with [`DbHandle::open`] and released with
/// [`DbHandle::close`], which returns the connection and shuts the pool down.
/// Dropping the handle without closing still returns the connection, but
/// leaves pool shutdown to the runtime.
#[derive(Debug)]
pub struct DbHandle {
    pool: PgPool,
    conn: PoolConnection<Postgres>,
}

impl DbHandle {
    /// Connect using the configured URL and TLS policy.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::Config` for an unparsable URL and
    /// `ProvisionError::Connect` if no connection can be acquired.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, ProvisionError> {
        let options = config.connect_options()?;
        Self::open_with(options).await
    }

    /// Connect with pre-built options.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::Connect` if no connection can be acquired.
    pub async fn open_with(options: PgConnectOptions) -> Result<Self, ProvisionError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy_with(options);

        match pool.acquire().await {
            Ok(conn) => {
                tracing::debug!("Database connection acquired");
                Ok(Self { pool, conn })
            }
            Err(e) => {
                pool.close().await;
                Err(ProvisionError::Connect(e))
            }
        }
    }

    /// The connection jobs run their statements on.
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    /// Release the connection and close the pool.
    pub async fn close(self) {
        let Self { pool, conn } = self;
        drop(conn);
        pool.close().await;
        tracing::debug!("Database connection released");
    }
}

/// Create a `PostgreSQL` connection pool for the storefront server.
///
/// # Errors
///
/// Returns `ProvisionError` if the URL is invalid or the connection cannot be established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, ProvisionError> {
    let options = config.connect_options()?;
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
        .map_err(ProvisionError::Connect)
}

/// Map a unique-violation into `RepositoryError::Conflict`.
pub(crate) fn conflict_or_database(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}
