//! Configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `PAPELARIA_ENV` - `production` enforces server certificate validation;
//!   anything else (default `development`) relaxes it
//! - `DATABASE_SSL_ROOT_CERT` - CA bundle used to verify the server certificate
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_PUBLIC_DIR` - Static files directory (default: public)
//! - `LOG_FORMAT` - `json` for structured logs, otherwise human-readable

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server certificate policy for the database connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Use TLS when the server offers it, without verifying the certificate.
    #[default]
    Relaxed,
    /// Require TLS and verify the certificate chain and host name.
    Enforced,
}

impl TlsMode {
    /// Pick the policy for a deployment environment name.
    #[must_use]
    pub fn for_environment(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Self::Enforced
        } else {
            Self::Relaxed
        }
    }

    #[must_use]
    pub const fn ssl_mode(self) -> PgSslMode {
        match self {
            Self::Relaxed => PgSslMode::Prefer,
            Self::Enforced => PgSslMode::VerifyFull,
        }
    }
}

/// Database connection settings shared by the batch jobs and the server.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Certificate policy
    pub tls: TlsMode,
    /// Optional CA bundle for `TlsMode::Enforced`
    pub ssl_root_cert: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `DATABASE_URL` is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_source(|key| std::env::var(key).ok())
    }

    fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = get("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_owned()))?;
        let tls = get("PAPELARIA_ENV")
            .map(|env| TlsMode::for_environment(&env))
            .unwrap_or_default();
        let ssl_root_cert = get("DATABASE_SSL_ROOT_CERT").map(PathBuf::from);

        Ok(Self {
            database_url,
            tls,
            ssl_root_cert,
        })
    }

    /// Build connection options with the configured TLS policy applied.
    ///
    /// The policy overrides any `sslmode` given in the URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL cannot be parsed.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        let mut options = PgConnectOptions::from_str(self.database_url.expose_secret())
            .map_err(|e| ConfigError::InvalidEnvVar("DATABASE_URL".to_owned(), e.to_string()))?
            .ssl_mode(self.tls.ssl_mode());

        if let Some(cert) = &self.ssl_root_cert {
            options = options.ssl_root_cert(cert);
        }

        Ok(options)
    }
}

/// Redirect server configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub database: DatabaseConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory holding `index.html` and other static assets
    pub public_dir: PathBuf,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database = DatabaseConfig::from_env()?;
        Self::from_source(database, |key| std::env::var(key).ok())
    }

    fn from_source(
        database: DatabaseConfig,
        get: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let host = get("STOREFRONT_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_owned())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_owned(), e.to_string()))?;
        let port = get("STOREFRONT_PORT")
            .unwrap_or_else(|| "3000".to_owned())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_owned(), e.to_string()))?;
        let public_dir = PathBuf::from(get("STOREFRONT_PUBLIC_DIR").unwrap_or_else(|| "public".to_owned()));

        Ok(Self {
            database,
            host,
            port,
            public_dir,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
