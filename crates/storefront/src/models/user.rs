//! User domain types.

use chrono::NaiveDateTime;

use papelaria_core::{Email, UserId};

/// A customer or administrator account.
///
/// `password_hash` is produced by the external auth layer and stored as-is.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_admin: bool,
    pub created_at: Option<NaiveDateTime>,
}

/// Fields required to create a [`User`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_admin: bool,
}
