//! Web session maintenance.

use chrono::Utc;
use tracing::info;

use papelaria_storefront::config::DatabaseConfig;
use papelaria_storefront::db::{SessionRepository, create_pool};

/// Delete sessions that have expired.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the delete fails.
pub async fn prune() -> Result<(), Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    let pool = create_pool(&config).await?;

    let now = Utc::now().naive_utc();
    let result = SessionRepository::new(&pool).prune_expired(now).await;
    pool.close().await;
    let removed = result?;

    info!("Removed {removed} expired session(s)");
    Ok(())
}
