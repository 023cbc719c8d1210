//! Schema initializer and seed loader against a real database.
//!
//! Requires `TEST_DATABASE_URL`; see the crate docs.

#![allow(clippy::unwrap_used)]

use papelaria_integration_tests::TestDatabase;
use papelaria_storefront::db::schema::{SCHEMA, initialize_schema, schema_status};
use papelaria_storefront::db::seed::{SeedReport, seed_catalog};
use papelaria_storefront::db::{Catalog, CategoryRepository, ProductRepository, ProvisionError};

macro_rules! test_database {
    () => {
        match TestDatabase::create().await.unwrap() {
            Some(db) => db,
            None => return,
        }
    };
}

async fn count(pool: &sqlx::PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_setup_creates_every_object() {
    let db = test_database!();
    let mut handle = db.handle().await.unwrap();

    let before = schema_status(handle.connection()).await.unwrap();
    assert!(!before.is_complete());

    initialize_schema(handle.connection()).await.unwrap();

    let after = schema_status(handle.connection()).await.unwrap();
    assert!(after.is_complete(), "missing: {:?}", after.missing);
    assert_eq!(after.present.len(), SCHEMA.len());

    handle.close().await;
    db.teardown().await.unwrap();
}

/// Columns, indexes and constraints of `schema`, one line per object.
async fn schema_snapshot(conn: &mut sqlx::PgConnection, schema: &str) -> Vec<String> {
    let columns: Vec<(String, String, String, Option<String>, String)> = sqlx::query_as(
        r"
        SELECT table_name::text, column_name::text, data_type::text,
               column_default::text, is_nullable::text
        FROM information_schema.columns
        WHERE table_schema = $1
        ORDER BY table_name, ordinal_position
        ",
    )
    .bind(schema)
    .fetch_all(&mut *conn)
    .await
    .unwrap();

    let indexes: Vec<(String, String)> = sqlx::query_as(
        "SELECT indexname::text, indexdef FROM pg_indexes WHERE schemaname = $1 ORDER BY indexname",
    )
    .bind(schema)
    .fetch_all(&mut *conn)
    .await
    .unwrap();

    let constraints: Vec<(String, String)> = sqlx::query_as(
        r"
        SELECT c.conname::text, pg_get_constraintdef(c.oid)
        FROM pg_constraint c
        JOIN pg_namespace n ON n.oid = c.connamespace
        WHERE n.nspname = $1
        ORDER BY c.conname
        ",
    )
    .bind(schema)
    .fetch_all(&mut *conn)
    .await
    .unwrap();

    columns
        .into_iter()
        .map(|(table, column, ty, default, nullable)| {
            format!("column {table}.{column} {ty} default={default:?} nullable={nullable}")
        })
        .chain(indexes.into_iter().map(|(name, def)| format!("index {name}: {def}")))
        .chain(
            constraints
                .into_iter()
                .map(|(name, def)| format!("constraint {name}: {def}")),
        )
        .collect()
}

#[tokio::test]
async fn test_setup_is_idempotent() {
    let db = test_database!();
    let mut handle = db.handle().await.unwrap();

    initialize_schema(handle.connection()).await.unwrap();
    let once = schema_snapshot(handle.connection(), db.schema()).await;
    assert!(!once.is_empty());

    initialize_schema(handle.connection()).await.unwrap();
    initialize_schema(handle.connection()).await.unwrap();
    let thrice = schema_snapshot(handle.connection(), db.schema()).await;
    assert_eq!(once, thrice);

    let status = schema_status(handle.connection()).await.unwrap();
    assert!(status.is_complete());

    handle.close().await;
    db.teardown().await.unwrap();
}

#[tokio::test]
async fn test_setup_preserves_existing_rows() {
    let db = test_database!();
    let mut handle = db.handle().await.unwrap();
    initialize_schema(handle.connection()).await.unwrap();
    seed_catalog(handle.connection(), &Catalog::builtin())
        .await
        .unwrap();

    initialize_schema(handle.connection()).await.unwrap();
    handle.close().await;

    let pool = db.pool().await.unwrap();
    assert_eq!(count(&pool, "categories").await, 6);
    assert_eq!(count(&pool, "products").await, 18);
    pool.close().await;
    db.teardown().await.unwrap();
}

#[tokio::test]
async fn test_fresh_database_seed() {
    let db = test_database!();
    let mut handle = db.handle().await.unwrap();
    initialize_schema(handle.connection()).await.unwrap();

    let first = seed_catalog(handle.connection(), &Catalog::builtin())
        .await
        .unwrap();
    assert_eq!(
        first,
        SeedReport {
            categories_inserted: 6,
            products_inserted: 18,
            categories_total: 6,
            products_total: 18,
        }
    );

    let second = seed_catalog(handle.connection(), &Catalog::builtin())
        .await
        .unwrap();
    assert_eq!(second.categories_inserted, 0);
    assert_eq!(second.products_inserted, 0);
    assert_eq!(second.categories_total, 6);
    assert_eq!(second.products_total, 18);

    handle.close().await;
    db.teardown().await.unwrap();
}

#[tokio::test]
async fn test_seeded_products_reference_their_categories() {
    let db = test_database!();
    let mut handle = db.handle().await.unwrap();
    initialize_schema(handle.connection()).await.unwrap();
    seed_catalog(handle.connection(), &Catalog::builtin())
        .await
        .unwrap();
    handle.close().await;

    let pool = db.pool().await.unwrap();
    let dangling: i64 = sqlx::query_scalar(
        r"
        SELECT COUNT(*) FROM products p
        LEFT JOIN categories c ON c.id = p.category_id
        WHERE c.id IS NULL
        ",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(dangling, 0);

    let escola = CategoryRepository::new(&pool)
        .find_by_name("Escola")
        .await
        .unwrap()
        .unwrap();
    let caderno = ProductRepository::new(&pool)
        .get_by_name("Caderno Universitário")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(caderno.category_id, Some(escola.id));
    assert_eq!(caderno.price.to_string(), "R$ 24,90");
    assert_eq!(caderno.stock.get(), 50);

    pool.close().await;
    db.teardown().await.unwrap();
}

#[tokio::test]
async fn test_seed_after_partial_categories_resolves_by_name() {
    let db = test_database!();
    let mut handle = db.handle().await.unwrap();
    initialize_schema(handle.connection()).await.unwrap();
    sqlx::raw_sql("INSERT INTO categories (name) VALUES ('Escrita'), ('Arte')")
        .execute(handle.connection())
        .await
        .unwrap();

    let report = seed_catalog(handle.connection(), &Catalog::builtin())
        .await
        .unwrap();
    assert_eq!(report.categories_inserted, 4);
    assert_eq!(report.categories_total, 6);
    handle.close().await;

    let pool = db.pool().await.unwrap();
    let escrita = CategoryRepository::new(&pool)
        .find_by_name("Escrita")
        .await
        .unwrap()
        .unwrap();
    let lapis = ProductRepository::new(&pool)
        .get_by_name("Kit Lápis")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(lapis.category_id, Some(escrita.id));

    pool.close().await;
    db.teardown().await.unwrap();
}

#[tokio::test]
async fn test_seed_skips_product_clashing_on_id() {
    let db = test_database!();
    let mut handle = db.handle().await.unwrap();
    initialize_schema(handle.connection()).await.unwrap();

    // A restored row holding an id the serial sequence has not yet handed out
    sqlx::raw_sql("INSERT INTO products (id, name, price) VALUES (1, 'Produto Legado', 1.00)")
        .execute(handle.connection())
        .await
        .unwrap();

    let report = seed_catalog(handle.connection(), &Catalog::builtin())
        .await
        .unwrap();
    assert_eq!(report.categories_total, 6);
    assert_eq!(report.products_inserted, 17);
    assert_eq!(report.products_total, 18);
    handle.close().await;

    let pool = db.pool().await.unwrap();
    let legacy = ProductRepository::new(&pool)
        .get_by_name("Produto Legado")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(legacy.id.get(), 1);

    pool.close().await;
    db.teardown().await.unwrap();
}

#[tokio::test]
async fn test_seed_before_setup_fails() {
    let db = test_database!();
    let mut handle = db.handle().await.unwrap();

    let err = seed_catalog(handle.connection(), &Catalog::builtin())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProvisionError::Statement {
            step: "insert categories",
            ..
        }
    ));

    handle.close().await;
    db.teardown().await.unwrap();
}

#[tokio::test]
async fn test_setup_fails_on_duplicate_product_names() {
    let db = test_database!();
    let mut handle = db.handle().await.unwrap();
    initialize_schema(handle.connection()).await.unwrap();

    // A table created before the name index existed may hold duplicates
    sqlx::raw_sql(
        r#"
        DROP INDEX "products_name_key";
        INSERT INTO products (name, price) VALUES ('Estojo', 10.00), ('Estojo', 12.00);
        "#,
    )
    .execute(handle.connection())
    .await
    .unwrap();

    let err = initialize_schema(handle.connection()).await.unwrap_err();
    assert!(matches!(
        err,
        ProvisionError::Statement {
            step: "create product name index",
            ..
        }
    ));

    handle.close().await;
    db.teardown().await.unwrap();
}
