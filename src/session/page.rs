//! Page context implementation
//!
//! One CDP target, optionally inside its own browser context, owned by a single request.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cdp::traits::{CdpBrowser, CdpClient};
use crate::cdp::types::RequestPaused;
use crate::session::routing::{RequestPolicy, RouteDecision};
use crate::session::traits::{ElementHandle, NavigationOptions, NavigationResult, PageContext};
use crate::Error;

const READY_STATE_POLL: Duration = Duration::from_millis(50);

/// Page context implementation
#[derive(Debug)]
pub struct PageContextImpl {
    id: String,
    session_id: String,
    target_id: String,
    browser_context_id: Option<String>,
    object_group: String,
    cdp_client: Arc<dyn CdpClient>,
    cdp_browser: Arc<dyn CdpBrowser>,
    is_active: AtomicBool,
}

impl PageContextImpl {
    /// Create a new page context
    pub fn new(
        session_id: String,
        target_id: String,
        browser_context_id: Option<String>,
        cdp_client: Arc<dyn CdpClient>,
        cdp_browser: Arc<dyn CdpBrowser>,
    ) -> Self {
        let id = Uuid::new_v4().to_string();
        Self {
            object_group: format!("locator-forge-{}", id),
            id,
            session_id,
            target_id,
            browser_context_id,
            cdp_client,
            cdp_browser,
            is_active: AtomicBool::new(true),
        }
    }

    /// CDP target backing this page
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    fn ensure_active(&self) -> Result<(), Error> {
        if self.is_active.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(Error::page_closed(&self.id))
        }
    }

    async fn wait_for_load_state(&self, options: &NavigationOptions) -> String {
        loop {
            match self.cdp_client.ready_state().await {
                Ok(state) if options.wait_until.is_reached(&state) => return state,
                Ok(state) => debug!(page = %self.id, state = %state, "Waiting for load state"),
                // The execution context is replaced while the new document commits
                Err(e) => debug!(page = %self.id, "readyState unavailable: {}", e),
            }
            tokio::time::sleep(READY_STATE_POLL).await;
        }
    }
}

#[async_trait]
impl PageContext for PageContextImpl {
    fn id(&self) -> &str {
        &self.id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn navigate(&self, url: &str, options: NavigationOptions) -> Result<NavigationResult, Error> {
        self.ensure_active()?;

        let budget = Duration::from_millis(options.timeout);
        let navigation = async {
            let committed = self.cdp_client.navigate(url).await?;
            if let Some(error_text) = committed.error_text {
                return Err(Error::navigation_error(format!("{} ({})", error_text, url)));
            }
            let ready_state = self.wait_for_load_state(&options).await;
            Ok(NavigationResult {
                url: committed.url,
                ready_state,
            })
        };

        match tokio::time::timeout(budget, navigation).await {
            Ok(result) => result,
            Err(_) => Err(Error::navigation_timeout(format!(
                "{} not ready after {}ms",
                url, options.timeout
            ))),
        }
    }

    async fn query_all(&self, selector: &str, limit: usize) -> Result<Vec<ElementHandle>, Error> {
        self.ensure_active()?;

        let script = format!(
            "Array.from(document.querySelectorAll({})).slice(0, {})",
            serde_json::to_string(selector)?,
            limit
        );
        let list_id = self
            .cdp_client
            .evaluate_handle(&script, &self.object_group)
            .await?
            .ok_or_else(|| Error::collection_failure("Selector query returned no node list"))?;

        let mut handles: Vec<ElementHandle> = self
            .cdp_client
            .get_properties(&list_id)
            .await?
            .into_iter()
            .filter_map(|(name, object_id)| {
                let index = name.parse::<usize>().ok()?;
                Some(ElementHandle::new(object_id?, index))
            })
            .collect();
        handles.sort_by_key(|handle| handle.index());
        Ok(handles)
    }

    async fn evaluate_on(
        &self,
        element: &ElementHandle,
        function: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, Error> {
        self.ensure_active()?;
        self.cdp_client
            .call_function_on(element.object_id(), function, args)
            .await
    }

    async fn apply_request_policy(&self, policy: RequestPolicy) -> Result<(), Error> {
        self.ensure_active()?;
        if policy.is_allow_all() {
            return Ok(());
        }

        let mut paused = self.cdp_client.subscribe_events("Fetch.requestPaused").await?;
        let patterns: Vec<serde_json::Value> = policy
            .blocked_kinds()
            .map(|kind| {
                serde_json::json!({
                    "urlPattern": "*",
                    "resourceType": kind.cdp_name(),
                    "requestStage": "Request",
                })
            })
            .collect();
        self.cdp_client
            .call_method("Fetch.enable", serde_json::json!({ "patterns": patterns }))
            .await?;

        let client = Arc::clone(&self.cdp_client);
        let page_id = self.id.clone();
        tokio::spawn(async move {
            while let Some(event) = paused.recv().await {
                let request: RequestPaused = match serde_json::from_value(event.params) {
                    Ok(request) => request,
                    Err(e) => {
                        warn!(page = %page_id, "Malformed Fetch.requestPaused: {}", e);
                        continue;
                    }
                };

                let (method, params) = match policy.decide(&request.resource_type) {
                    RouteDecision::Allow => (
                        "Fetch.continueRequest",
                        serde_json::json!({ "requestId": request.request_id }),
                    ),
                    RouteDecision::Abort => (
                        "Fetch.failRequest",
                        serde_json::json!({
                            "requestId": request.request_id,
                            "errorReason": "BlockedByClient",
                        }),
                    ),
                };
                debug!(page = %page_id, url = %request.request.url, "{}", method);

                if let Err(e) = client.call_method(method, params).await {
                    if !client.connection().is_active() {
                        break;
                    }
                    debug!(page = %page_id, "Routing verdict not delivered: {}", e);
                }
            }
        });

        Ok(())
    }

    async fn close(&self) -> Result<(), Error> {
        if !self.is_active.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        if let Err(e) = self.cdp_client.release_object_group(&self.object_group).await {
            debug!(page = %self.id, "Object group not released: {}", e);
        }
        let closed = self.cdp_browser.close_target(&self.target_id).await;
        if let Some(context_id) = &self.browser_context_id {
            if let Err(e) = self.cdp_browser.dispose_browser_context(context_id).await {
                warn!(page = %self.id, "Failed to dispose browser context {}: {}", context_id, e);
            }
        }
        if let Err(e) = self.cdp_client.connection().close().await {
            debug!(page = %self.id, "Page connection close failed: {}", e);
        }

        closed
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Acquire)
    }
}
