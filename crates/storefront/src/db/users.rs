//! User repository for database operations.

use chrono::NaiveDateTime;
use sqlx::PgPool;

use papelaria_core::{Email, UserId};

use super::{RepositoryError, conflict_or_database};
use crate::models::{NewUser, User};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    password_hash: String,
    phone: Option<String>,
    address: Option<String>,
    is_admin: Option<bool>,
    created_at: Option<NaiveDateTime>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email,
            password_hash: row.password_hash,
            phone: row.phone,
            address: row.address,
            is_admin: row.is_admin.unwrap_or(false),
            created_at: row.created_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, name, email, password_hash, phone, address, is_admin, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Validation` if a field does not fit its column.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        if user.name.trim().is_empty() || user.name.chars().count() > 150 {
            return Err(RepositoryError::Validation(
                "name must be 1-150 characters".to_owned(),
            ));
        }
        if user.phone.as_ref().is_some_and(|p| p.chars().count() > 30) {
            return Err(RepositoryError::Validation(
                "phone must be at most 30 characters".to_owned(),
            ));
        }

        let row: UserRow = sqlx::query_as(
            r"
            INSERT INTO users (name, email, password_hash, phone, address, is_admin)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, password_hash, phone, address, is_admin, created_at
            ",
        )
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.is_admin)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_or_database(e, "email"))?;

        User::try_from(row)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(email: &str) -> UserRow {
        UserRow {
            id: UserId::new(uuid::Uuid::nil()),
            name: "Ana".to_owned(),
            email: email.to_owned(),
            password_hash: "hash".to_owned(),
            phone: None,
            address: None,
            is_admin: None,
            created_at: None,
        }
    }

    #[test]
    fn test_row_conversion_defaults_admin_flag() {
        let user = User::try_from(row("ana@example.com")).unwrap();
        assert!(!user.is_admin);
        assert_eq!(user.email.as_str(), "ana@example.com");
    }

    #[test]
    fn test_invalid_stored_email_is_corruption() {
        let err = User::try_from(row("not-an-email")).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
