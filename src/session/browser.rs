//! Rendering session implementation
//!
//! Wraps the browser-level CDP handle and creates pages on it.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cdp::traits::{BrowserVersion, CdpBrowser};
use crate::session::page::PageContextImpl;
use crate::session::traits::{PageContext, PageOptions, RenderingSession};
use crate::Error;

/// Rendering session implementation
#[derive(Debug)]
pub struct RenderingSessionImpl {
    id: String,
    cdp_browser: Arc<dyn CdpBrowser>,
    pages_opened: AtomicU64,
}

impl RenderingSessionImpl {
    /// Create a new rendering session
    pub fn new(cdp_browser: Arc<dyn CdpBrowser>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            cdp_browser,
            pages_opened: AtomicU64::new(0),
        }
    }

    /// Engine version
    pub async fn version(&self) -> Result<BrowserVersion, Error> {
        self.cdp_browser.get_version().await
    }

    /// Pages opened over the session's lifetime
    pub fn pages_opened(&self) -> u64 {
        self.pages_opened.load(Ordering::Relaxed)
    }

    async fn discard(&self, target_id: Option<&str>, context_id: Option<&str>) {
        if let Some(target_id) = target_id {
            if let Err(e) = self.cdp_browser.close_target(target_id).await {
                warn!(session = %self.id, "Failed to close target {}: {}", target_id, e);
            }
        }
        if let Some(context_id) = context_id {
            if let Err(e) = self.cdp_browser.dispose_browser_context(context_id).await {
                warn!(session = %self.id, "Failed to dispose context {}: {}", context_id, e);
            }
        }
    }
}

#[async_trait]
impl RenderingSession for RenderingSessionImpl {
    fn id(&self) -> &str {
        &self.id
    }

    async fn new_page(&self, options: PageOptions) -> Result<Arc<dyn PageContext>, Error> {
        if !self.cdp_browser.is_active() {
            return Err(Error::browser_init_failure("Rendering session is no longer connected"));
        }

        let context_id = if options.isolated {
            Some(self.cdp_browser.create_browser_context().await?)
        } else {
            None
        };

        let target_id = match self
            .cdp_browser
            .create_target(&options.initial_url, context_id.as_deref())
            .await
        {
            Ok(target_id) => target_id,
            Err(e) => {
                self.discard(None, context_id.as_deref()).await;
                return Err(e);
            }
        };

        let cdp_client = match self.cdp_browser.create_client(&target_id).await {
            Ok(client) => client,
            Err(e) => {
                self.discard(Some(&target_id), context_id.as_deref()).await;
                return Err(e);
            }
        };

        self.pages_opened.fetch_add(1, Ordering::Relaxed);
        debug!(session = %self.id, target = %target_id, "Opened page");

        Ok(Arc::new(PageContextImpl::new(
            self.id.clone(),
            target_id,
            context_id,
            cdp_client,
            Arc::clone(&self.cdp_browser),
        )))
    }

    async fn close(&self) -> Result<(), Error> {
        self.cdp_browser.close().await
    }

    fn is_active(&self) -> bool {
        self.cdp_browser.is_active()
    }
}
