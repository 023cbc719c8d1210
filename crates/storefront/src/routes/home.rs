//! Root redirect page.
//!
//! The storefront itself is the static site in the public directory; `/`
//! only forwards the browser to its entry page.

use askama::Template;
use askama_web::WebTemplate;
use tracing::instrument;

/// Entry page of the static storefront.
pub const REDIRECT_TARGET: &str = "/index.html";

/// Store name shown while redirecting.
pub const STORE_NAME: &str = "Papelaria Santa Fé";

/// Redirect page template.
///
/// Redirects twice over: a `meta refresh` for browsers without scripts and
/// `window.location.href` for the rest.
#[derive(Template, WebTemplate)]
#[template(path = "redirect.html")]
pub struct RedirectTemplate {
    pub store_name: &'static str,
    pub target: &'static str,
}

impl Default for RedirectTemplate {
    fn default() -> Self {
        Self {
            store_name: STORE_NAME,
            target: REDIRECT_TARGET,
        }
    }
}

/// Display the redirect page.
#[instrument]
pub async fn index() -> RedirectTemplate {
    RedirectTemplate::default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_page_content() {
        let html = RedirectTemplate::default().render().unwrap();

        assert!(html.contains("<title>Papelaria Santa Fé</title>"));
        assert!(html.contains("Redirecionando..."));
        assert!(html.contains(r#"content="0; url=/index.html""#));
        assert!(html.contains(r#"window.location.href = "/index.html";"#));
    }
}
