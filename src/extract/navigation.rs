//! Navigation controller
//!
//! Validates the target URL, opens an isolated page on the shared session and
//! drives it to DOM-content-ready, normalizing every failure into the
//! navigation taxonomy.

use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::session::{
    LoadState, NavigationOptions, NavigationResult, PageContext, PageOptions, RequestPolicy,
    SessionManager,
};
use crate::Error;

/// Parse `url`, accepting only absolute http/https URLs with a host
pub fn validate_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url.trim()).map_err(|e| Error::invalid_url(format!("{}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(Error::invalid_url(format!(
                "{}: scheme '{}' is not http or https",
                url, scheme
            )))
        }
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(Error::invalid_url(format!("{}: missing host", url)));
    }

    Ok(parsed)
}

/// Map any navigation failure into the navigation taxonomy
pub fn classify_navigation_error(error: Error) -> Error {
    match error {
        Error::NavigationTimeout(_)
        | Error::NavigationError(_)
        | Error::UnknownNavigationError(_) => error,
        Error::Timeout(msg) => Error::navigation_timeout(msg),
        Error::Cdp(msg) => Error::navigation_error(msg),
        other => Error::unknown_navigation_error(other.to_string()),
    }
}

/// Opens and navigates pages
#[derive(Clone)]
pub struct NavigationController {
    sessions: Arc<dyn SessionManager>,
    timeout: Duration,
    request_policy: RequestPolicy,
}

impl NavigationController {
    /// Create a controller over the shared session manager
    pub fn new(sessions: Arc<dyn SessionManager>, timeout: Duration, request_policy: RequestPolicy) -> Self {
        Self {
            sessions,
            timeout,
            request_policy,
        }
    }

    /// Navigation budget
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Validate `url` and open a fresh isolated page for it
    ///
    /// Nothing touches the engine when the URL is rejected.
    pub async fn open(&self, url: &str) -> Result<Arc<dyn PageContext>, Error> {
        validate_url(url)?;

        let page = self
            .sessions
            .open_page(PageOptions::default())
            .await
            .map_err(|e| match e {
                Error::BrowserInitFailure(_) => e,
                other => Error::browser_init_failure(format!("Could not open a page: {}", other)),
            })?;
        debug!(page = %page.id(), session = %page.session_id(), "Page opened");

        if let Err(e) = page.apply_request_policy(self.request_policy.clone()).await {
            warn!(page = %page.id(), "Request routing not installed: {}", e);
        }

        Ok(page)
    }

    /// Navigate `page` to `url`, waiting for DOM content within the budget
    pub async fn navigate(&self, page: &dyn PageContext, url: &str) -> Result<NavigationResult, Error> {
        let options = NavigationOptions {
            timeout: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            wait_until: LoadState::DOMContentLoaded,
        };

        page.navigate(url, options).await.map_err(classify_navigation_error)
    }
}

impl std::fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("timeout", &self.timeout)
            .field("request_policy", &self.request_policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::mock::{MockNavigation, MockPageScript, MockSessionManager};

    fn controller(manager: Arc<MockSessionManager>, timeout_ms: u64) -> NavigationController {
        NavigationController::new(
            manager,
            Duration::from_millis(timeout_ms),
            RequestPolicy::block_heavy_resources(),
        )
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/login").is_ok());
        assert!(validate_url("http://localhost:8080").is_ok());
        assert!(matches!(validate_url("ftp://example.com"), Err(Error::InvalidUrl(_))));
        assert!(matches!(validate_url("javascript:alert(1)"), Err(Error::InvalidUrl(_))));
        assert!(matches!(validate_url("example.com"), Err(Error::InvalidUrl(_))));
        assert!(matches!(validate_url(""), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_classify() {
        assert!(matches!(
            classify_navigation_error(Error::timeout("Page.navigate")),
            Error::NavigationTimeout(_)
        ));
        assert!(matches!(
            classify_navigation_error(Error::cdp("net::ERR_CONNECTION_REFUSED")),
            Error::NavigationError(msg) if msg.contains("ERR_CONNECTION_REFUSED")
        ));
        assert!(matches!(
            classify_navigation_error(Error::websocket("closed")),
            Error::UnknownNavigationError(_)
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_opens_nothing() {
        let manager = Arc::new(MockSessionManager::new(MockPageScript::new()));

        let result = controller(manager.clone(), 1000).open("mailto:someone@example.com").await;

        assert!(matches!(result, Err(Error::InvalidUrl(_))));
        assert_eq!(manager.acquisitions(), 0);
        assert!(manager.pages().await.is_empty());
    }

    #[tokio::test]
    async fn test_open_installs_routing_policy() {
        let manager = Arc::new(MockSessionManager::new(MockPageScript::new()));

        controller(manager.clone(), 1000).open("https://example.com").await.unwrap();

        let page = manager.pages().await.remove(0);
        assert_eq!(page.request_policy().await, Some(RequestPolicy::block_heavy_resources()));
    }

    #[tokio::test]
    async fn test_init_failure_surfaces() {
        let manager = Arc::new(MockSessionManager::new(MockPageScript::new()).failing(1));
        let controller = controller(manager.clone(), 1000);

        let first = controller.open("https://example.com").await;
        assert!(matches!(first, Err(Error::BrowserInitFailure(_))));

        assert!(controller.open("https://example.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_navigation_failures_classified() {
        let cases = [
            (MockNavigation::Hang, "NavigationTimeout"),
            (MockNavigation::EngineError("net::ERR_NAME_NOT_RESOLVED".to_string()), "NavigationError"),
            (MockNavigation::Disconnected, "UnknownNavigationError"),
        ];

        for (navigation, kind) in cases {
            let manager = Arc::new(MockSessionManager::new(MockPageScript::new().navigation(navigation)));
            let controller = controller(manager, 50);

            let page = controller.open("https://example.com").await.unwrap();
            let error = controller.navigate(page.as_ref(), "https://example.com").await.unwrap_err();
            assert_eq!(error.kind(), kind);
        }
    }
}
