//! Report which schema objects exist.

use thiserror::Error;
use tracing::{info, warn};

use papelaria_storefront::config::DatabaseConfig;
use papelaria_storefront::db::DbHandle;
use papelaria_storefront::db::schema::schema_status;

/// The schema is only partly provisioned.
#[derive(Debug, Error)]
#[error("{missing} schema object(s) missing; run `papelaria setup`")]
pub struct IncompleteSchema {
    pub missing: usize,
}

/// Inspect the schema.
///
/// # Errors
///
/// Returns an error if the database is unreachable, a catalog query fails, or
/// any expected object is missing.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    let mut handle = DbHandle::open(&config).await?;
    let result = schema_status(handle.connection()).await;
    handle.close().await;
    let status = result?;

    for object in &status.present {
        info!("  present: {}", object.name());
    }
    for object in &status.missing {
        warn!("  missing: {}", object.name());
    }

    if status.is_complete() {
        info!(objects = status.present.len(), "Schema is complete");
        Ok(())
    } else {
        Err(IncompleteSchema {
            missing: status.missing.len(),
        }
        .into())
    }
}
