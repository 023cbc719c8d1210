//! Seed categories and demonstration products.

use std::path::Path;

use tracing::{error, info};

use papelaria_storefront::config::DatabaseConfig;
use papelaria_storefront::db::seed::seed_catalog;
use papelaria_storefront::db::{Catalog, DbHandle};

/// Seed the built-in catalog, or the YAML catalog at `catalog_path`.
///
/// The catalog is validated before connecting to the database.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read or is invalid, the database
/// is unreachable, or any statement fails (including when `setup` has not
/// been run).
pub async fn run(catalog_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = match catalog_path {
        Some(path) => {
            info!(path = %path.display(), "Loading catalog from file");
            Catalog::from_yaml_file(path).await?
        }
        None => Catalog::builtin(),
    };

    let issues = catalog.validate();
    if !issues.is_empty() {
        error!("Catalog validation failed:");
        for issue in &issues {
            error!("  - {issue}");
        }
        return Err(format!("{} catalog problem(s) found", issues.len()).into());
    }
    info!(
        categories = catalog.categories.len(),
        products = catalog.products.len(),
        "Catalog validated"
    );

    let config = DatabaseConfig::from_env()?;
    let mut handle = DbHandle::open(&config).await?;
    let result = seed_catalog(handle.connection(), &catalog).await;
    handle.close().await;
    let report = result?;

    info!("Seeding complete!");
    info!("  Categories: {}", report.categories_total);
    info!("  Products: {}", report.products_total);
    info!(
        "  Inserted this run: {} categories, {} products",
        report.categories_inserted, report.products_inserted
    );
    info!("Next step: run the admin seeding script to create the administrator account");

    Ok(())
}
