//! Session management traits
//!
//! Abstract interfaces for the shared rendering session and the per-request pages it hands out.

use async_trait::async_trait;
use std::sync::Arc;

use crate::session::routing::RequestPolicy;

/// Page options for creating a new page
#[derive(Debug, Clone)]
pub struct PageOptions {
    /// Give the page its own browser context (cookies and storage not shared)
    pub isolated: bool,
    /// URL the target is created with
    pub initial_url: String,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            isolated: true,
            initial_url: "about:blank".to_string(),
        }
    }
}

/// Navigation options
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    /// Timeout in milliseconds
    pub timeout: u64,
    /// Wait until condition
    pub wait_until: LoadState,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            timeout: 15000,
            wait_until: LoadState::DOMContentLoaded,
        }
    }
}

/// Page load state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// All subresources loaded
    Load,
    /// Element tree parsed and queryable
    DOMContentLoaded,
}

impl LoadState {
    /// Whether `document.readyState` satisfies this condition
    pub fn is_reached(&self, ready_state: &str) -> bool {
        match self {
            LoadState::Load => ready_state == "complete",
            LoadState::DOMContentLoaded => ready_state == "interactive" || ready_state == "complete",
        }
    }
}

/// Navigation result
#[derive(Debug, Clone)]
pub struct NavigationResult {
    /// URL navigated to
    pub url: String,
    /// `document.readyState` when the wait condition was met
    pub ready_state: String,
}

/// Opaque reference to a DOM element of one page
///
/// Only valid while the page that produced it is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    object_id: String,
    index: usize,
}

impl ElementHandle {
    /// Create a handle for a remote object at a document-order position
    pub fn new<S: Into<String>>(object_id: S, index: usize) -> Self {
        Self {
            object_id: object_id.into(),
            index,
        }
    }

    /// Remote object id
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Position in document order
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Rendering session trait
///
/// The one live connection to the rendering engine, shared by all requests.
#[async_trait]
pub trait RenderingSession: Send + Sync + std::fmt::Debug {
    /// Get session ID
    fn id(&self) -> &str;

    /// Open a new page
    async fn new_page(&self, options: PageOptions) -> Result<Arc<dyn PageContext>, crate::Error>;

    /// Close the session and the engine behind it
    async fn close(&self) -> Result<(), crate::Error>;

    /// Check if the engine connection is still usable
    fn is_active(&self) -> bool;
}

/// Page context trait
///
/// A page owned by exactly one extraction request.
#[async_trait]
pub trait PageContext: Send + Sync + std::fmt::Debug {
    /// Get page ID
    fn id(&self) -> &str;

    /// Get parent session ID
    fn session_id(&self) -> &str;

    /// Navigate to URL and wait for `options.wait_until`, bounded by `options.timeout`
    async fn navigate(&self, url: &str, options: NavigationOptions) -> Result<NavigationResult, crate::Error>;

    /// Elements matching `selector` in document order, at most `limit`
    async fn query_all(&self, selector: &str, limit: usize) -> Result<Vec<ElementHandle>, crate::Error>;

    /// Call `function` with `this` bound to the element, returning its JSON value
    async fn evaluate_on(
        &self,
        element: &ElementHandle,
        function: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, crate::Error>;

    /// Install a sub-request routing policy
    async fn apply_request_policy(&self, policy: RequestPolicy) -> Result<(), crate::Error>;

    /// Close the page; closing twice is a no-op
    async fn close(&self) -> Result<(), crate::Error>;

    /// Check if page is active
    fn is_active(&self) -> bool;
}

/// Session manager trait
///
/// Owns the lazily created rendering session.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Shared session, starting the engine on first use
    async fn acquire_session(&self) -> Result<Arc<dyn RenderingSession>, crate::Error>;

    /// Open a fresh page on the shared session
    async fn open_page(&self, options: PageOptions) -> Result<Arc<dyn PageContext>, crate::Error> {
        self.acquire_session().await?.new_page(options).await
    }

    /// Close the session if one was started
    async fn shutdown(&self) -> Result<(), crate::Error>;

    /// Number of live sessions (0 or 1)
    fn session_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_content_loaded_accepts_interactive() {
        assert!(LoadState::DOMContentLoaded.is_reached("interactive"));
        assert!(LoadState::DOMContentLoaded.is_reached("complete"));
        assert!(!LoadState::DOMContentLoaded.is_reached("loading"));
        assert!(!LoadState::Load.is_reached("interactive"));
    }
}
