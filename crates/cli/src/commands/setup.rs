//! Create the storefront schema.

use tracing::info;

use papelaria_storefront::config::DatabaseConfig;
use papelaria_storefront::db::DbHandle;
use papelaria_storefront::db::schema::initialize_schema;

/// Run the schema initializer against `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is unreachable,
/// or any DDL statement fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    info!(tls = ?config.tls, "Connecting to database");

    let mut handle = DbHandle::open(&config).await?;
    let result = initialize_schema(handle.connection()).await;
    handle.close().await;
    result?;

    info!("Next step: papelaria seed");
    Ok(())
}
