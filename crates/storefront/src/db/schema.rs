//! Idempotent schema creation.
//!
//! Every statement is a `CREATE ... IF NOT EXISTS`, so running
//! [`initialize_schema`] against an already provisioned database changes
//! nothing. Statements run in dependency order and the first failure stops
//! the sequence; objects created before it stay in place.
//!
//! Column names and types are a contract with the web application and the
//! admin tool. Add objects here; do not alter existing ones.

use std::future::Future;

use sqlx::PgConnection;
use tracing::{info, instrument};

use super::ProvisionError;

/// Kind of database object a statement creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaObject {
    Extension(&'static str),
    Table(&'static str),
    Index(&'static str),
}

impl SchemaObject {
    /// Identifier of the object in the database.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Extension(name) | Self::Table(name) | Self::Index(name) => name,
        }
    }
}

/// A named DDL statement.
#[derive(Debug, Clone, Copy)]
pub struct SchemaStatement {
    /// Step name used in logs and errors.
    pub step: &'static str,
    pub object: SchemaObject,
    pub sql: &'static str,
}

/// The full schema, in the order it must be applied.
pub const SCHEMA: &[SchemaStatement] = &[
    SchemaStatement {
        step: "create uuid-ossp extension",
        object: SchemaObject::Extension("uuid-ossp"),
        sql: r#"CREATE EXTENSION IF NOT EXISTS "uuid-ossp""#,
    },
    SchemaStatement {
        step: "create users table",
        object: SchemaObject::Table("users"),
        sql: r"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY DEFAULT uuid_generate_v4(),
                name VARCHAR(150) NOT NULL,
                email VARCHAR(150) UNIQUE NOT NULL,
                password_hash VARCHAR(255) NOT NULL,
                phone VARCHAR(30),
                address TEXT,
                is_admin BOOLEAN DEFAULT FALSE,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
        ",
    },
    SchemaStatement {
        step: "create categories table",
        object: SchemaObject::Table("categories"),
        sql: r"
            CREATE TABLE IF NOT EXISTS categories (
                id SERIAL PRIMARY KEY,
                name VARCHAR(100) NOT NULL UNIQUE
            )
        ",
    },
    SchemaStatement {
        step: "create products table",
        object: SchemaObject::Table("products"),
        sql: r"
            CREATE TABLE IF NOT EXISTS products (
                id SERIAL PRIMARY KEY,
                name VARCHAR(200) NOT NULL,
                category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
                description TEXT,
                price NUMERIC(10,2) NOT NULL,
                stock INTEGER DEFAULT 0,
                image_url TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
        ",
    },
    SchemaStatement {
        step: "create orders table",
        object: SchemaObject::Table("orders"),
        sql: r"
            CREATE TABLE IF NOT EXISTS orders (
                id UUID PRIMARY KEY DEFAULT uuid_generate_v4(),
                user_id UUID REFERENCES users(id),
                total NUMERIC(10,2) NOT NULL,
                whatsapp_sent BOOLEAN DEFAULT FALSE,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
        ",
    },
    SchemaStatement {
        step: "create order_items table",
        object: SchemaObject::Table("order_items"),
        sql: r"
            CREATE TABLE IF NOT EXISTS order_items (
                id SERIAL PRIMARY KEY,
                order_id UUID REFERENCES orders(id) ON DELETE CASCADE,
                product_id INTEGER REFERENCES products(id),
                quantity INTEGER NOT NULL,
                unit_price NUMERIC(10,2) NOT NULL
            )
        ",
    },
    SchemaStatement {
        step: "create session table",
        object: SchemaObject::Table("session"),
        sql: r#"
            CREATE TABLE IF NOT EXISTS "session" (
                "sid" varchar NOT NULL COLLATE "default",
                "sess" json NOT NULL,
                "expire" timestamp(6) NOT NULL,
                CONSTRAINT "session_pkey" PRIMARY KEY ("sid")
            )
        "#,
    },
    SchemaStatement {
        step: "create session expiry index",
        object: SchemaObject::Index("IDX_session_expire"),
        sql: r#"CREATE INDEX IF NOT EXISTS "IDX_session_expire" ON "session" ("expire")"#,
    },
    // Natural key for products; the seed job's conflict-skip relies on it.
    // Fails if an existing table already holds duplicate product names.
    SchemaStatement {
        step: "create product name index",
        object: SchemaObject::Index("products_name_key"),
        sql: r#"CREATE UNIQUE INDEX IF NOT EXISTS "products_name_key" ON products (name)"#,
    },
];

/// Runs DDL statements. Implemented for [`PgConnection`]; tests substitute a fake.
pub trait SchemaExecutor {
    fn execute_ddl(
        &mut self,
        sql: &'static str,
    ) -> impl Future<Output = Result<(), sqlx::Error>>;
}

impl SchemaExecutor for PgConnection {
    async fn execute_ddl(&mut self, sql: &'static str) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(sql).execute(self).await?;
        Ok(())
    }
}

/// Apply [`SCHEMA`] in order, stopping at the first failing statement.
///
/// # Errors
///
/// Returns `ProvisionError::Statement` naming the step that failed.
#[instrument(skip(executor))]
#[allow(clippy::future_not_send)]
pub async fn initialize_schema<E: SchemaExecutor>(
    executor: &mut E,
) -> Result<(), ProvisionError> {
    info!(statements = SCHEMA.len(), "Starting database setup");

    for statement in SCHEMA {
        info!(step = statement.step, "Applying");
        executor
            .execute_ddl(statement.sql)
            .await
            .map_err(|source| ProvisionError::Statement {
                step: statement.step,
                source,
            })?;
    }

    info!("Database setup completed");
    Ok(())
}

/// Which [`SCHEMA`] objects currently exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaStatus {
    pub present: Vec<SchemaObject>,
    pub missing: Vec<SchemaObject>,
}

impl SchemaStatus {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Inspect the catalog for every object [`SCHEMA`] creates.
///
/// Tables and indexes are looked up through the connection's `search_path`.
///
/// # Errors
///
/// Returns `sqlx::Error` if a catalog query fails.
pub async fn schema_status(conn: &mut PgConnection) -> Result<SchemaStatus, sqlx::Error> {
    let mut status = SchemaStatus::default();

    for statement in SCHEMA {
        let exists: bool = match statement.object {
            SchemaObject::Extension(name) => {
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_extension WHERE extname = $1)")
                    .bind(name)
                    .fetch_one(&mut *conn)
                    .await?
            }
            SchemaObject::Table(name) | SchemaObject::Index(name) => {
                sqlx::query_scalar("SELECT to_regclass($1::text) IS NOT NULL")
                    .bind(format!("\"{name}\""))
                    .fetch_one(&mut *conn)
                    .await?
            }
        };

        if exists {
            status.present.push(statement.object);
        } else {
            status.missing.push(statement.object);
        }
    }

    Ok(status)
}
