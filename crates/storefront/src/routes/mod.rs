//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /              - Redirect page to /index.html
//! GET  /health        - Liveness check
//! GET  /health/ready  - Readiness check (database)
//! GET  /*             - Static files from the public directory
//! ```

pub mod health;
pub mod home;

use axum::{Router, middleware::from_fn, routing::get};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Dynamic routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// The complete application: routes, static fallback and middleware.
pub fn app(state: AppState) -> Router {
    let public_dir = state.config().public_dir.clone();

    routes()
        .fallback_service(ServeDir::new(public_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(request_id_middleware))
                .layer(from_fn(security_headers_middleware)),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{DatabaseConfig, StorefrontConfig, TlsMode};

    const UNREACHABLE: &str = "postgres://nobody@127.0.0.1:1/papelaria";

    fn test_app(public_dir: PathBuf) -> Router {
        let config = StorefrontConfig {
            database: DatabaseConfig {
                database_url: SecretString::from(UNREACHABLE.to_owned()),
                tls: TlsMode::Relaxed,
                ssl_root_cert: None,
            },
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            public_dir,
        };
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy(UNREACHABLE)
            .unwrap();
        app(AppState::new(config, pool))
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_root_serves_redirect_page() {
        let (status, headers, body) = fetch(test_app(PathBuf::from("public")), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(
            headers["content-type"]
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        assert!(headers.contains_key("x-request-id"));
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert!(body.contains("Redirecionando..."));
        assert!(body.contains("/index.html"));
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = fetch(test_app(PathBuf::from("public")), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_readiness_without_database() {
        let (status, _, _) = fetch(test_app(PathBuf::from("public")), "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_static_files_served_from_public_dir() {
        let dir = std::env::temp_dir().join(format!("papelaria-public-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "<h1>Loja</h1>").unwrap();

        let (status, _, body) = fetch(test_app(dir.clone()), "/index.html").await;
        let (missing, _, _) = fetch(test_app(dir.clone()), "/nope.html").await;
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Loja</h1>");
        assert_eq!(missing, StatusCode::NOT_FOUND);
    }
}
