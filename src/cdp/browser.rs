//! CDP browser control implementation
//!
//! Browser-level operations over the browser's own DevTools socket: isolated
//! contexts, page targets, version, shutdown.

use super::client::CdpClientImpl;
use super::connection::CdpWebSocketConnection;
use super::launcher::ProfileDir;
use super::traits::*;
use crate::Error;
use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;
use tokio::process::Child;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// CDP browser implementation
#[derive(Debug)]
pub struct CdpBrowserImpl {
    /// Browser WebSocket endpoint (e.g., "ws://127.0.0.1:9222/devtools/browser/<id>")
    endpoint: String,
    /// Browser-level connection
    connection: Arc<dyn CdpConnection>,
    /// Locally launched Chrome, if any; killed on drop
    process: Mutex<Option<Child>>,
    /// Profile of the launched Chrome; dropped after the process
    profile: Mutex<Option<ProfileDir>>,
}

impl CdpBrowserImpl {
    /// Wrap an established browser-level connection
    pub fn new<S: Into<String>>(endpoint: S, connection: Arc<dyn CdpConnection>, process: Option<Child>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connection,
            process: Mutex::new(process),
            profile: Mutex::new(None),
        }
    }

    /// Remove `profile` once the browser is closed or dropped
    pub fn with_profile_dir(mut self, profile: ProfileDir) -> Self {
        self.profile = Mutex::new(Some(profile));
        self
    }

    /// Connect to a browser-level DevTools WebSocket URL
    pub async fn connect<S: Into<String>>(endpoint: S, process: Option<Child>) -> Result<Self, Error> {
        let endpoint = endpoint.into();
        let connection = CdpWebSocketConnection::connect(endpoint.clone()).await?;
        Ok(Self::new(endpoint, connection, process))
    }

    /// WebSocket URL of a page target on the same DevTools server
    pub fn page_ws_url(endpoint: &str, target_id: &str) -> Result<String, Error> {
        let mut url = Url::parse(endpoint)
            .map_err(|e| Error::cdp(format!("Invalid DevTools endpoint {}: {}", endpoint, e)))?;
        url.set_path(&format!("/devtools/page/{}", target_id));
        url.set_query(None);
        Ok(url.to_string())
    }

    async fn browser_call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, Error> {
        let response = self.connection.send_command(method, params).await?;
        response.result.ok_or_else(|| Error::cdp(format!("No result for {}", method)))
    }

    fn string_field(value: &serde_json::Value, field: &str) -> Result<String, Error> {
        value
            .get(field)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| Error::cdp(format!("Missing {} in response", field)))
    }
}

#[async_trait]
impl CdpBrowser for CdpBrowserImpl {
    fn ws_endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn create_browser_context(&self) -> Result<String, Error> {
        let result = self
            .browser_call(
                "Target.createBrowserContext",
                serde_json::json!({ "disposeOnDetach": true }),
            )
            .await?;
        Self::string_field(&result, "browserContextId")
    }

    async fn create_target(&self, url: &str, browser_context_id: Option<&str>) -> Result<String, Error> {
        let mut params = serde_json::json!({ "url": url });
        if let Some(context_id) = browser_context_id {
            params["browserContextId"] = serde_json::json!(context_id);
        }

        let result = self.browser_call("Target.createTarget", params).await?;
        let target_id = Self::string_field(&result, "targetId")?;
        debug!(target_id = %target_id, "Created page target");
        Ok(target_id)
    }

    async fn create_client(&self, target_id: &str) -> Result<Arc<dyn CdpClient>, Error> {
        let ws_url = Self::page_ws_url(&self.endpoint, target_id)?;
        let connection = CdpWebSocketConnection::connect(ws_url).await?;
        let client = Arc::new(CdpClientImpl::new(connection));

        client.enable_domain("Page").await?;
        client.enable_domain("Runtime").await?;

        Ok(client)
    }

    async fn close_target(&self, target_id: &str) -> Result<(), Error> {
        self.browser_call("Target.closeTarget", serde_json::json!({ "targetId": target_id }))
            .await?;
        Ok(())
    }

    async fn dispose_browser_context(&self, browser_context_id: &str) -> Result<(), Error> {
        self.browser_call(
            "Target.disposeBrowserContext",
            serde_json::json!({ "browserContextId": browser_context_id }),
        )
        .await?;
        Ok(())
    }

    async fn get_version(&self) -> Result<BrowserVersion, Error> {
        let version = self.browser_call("Browser.getVersion", serde_json::json!({})).await?;
        let field = |name: &str| {
            version
                .get(name)
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string()
        };

        Ok(BrowserVersion {
            protocol_version: field("protocolVersion"),
            product: field("product"),
            user_agent: field("userAgent"),
            js_version: field("jsVersion"),
        })
    }

    async fn close(&self) -> Result<(), Error> {
        info!(endpoint = %self.endpoint, "Closing browser");

        if self.connection.is_active() {
            if let Err(e) = self.browser_call("Browser.close", serde_json::json!({})).await {
                debug!("Browser.close not acknowledged: {}", e);
            }
            let _ = self.connection.close().await;
        }

        if let Some(mut child) = self.process.lock().await.take() {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill Chrome process: {}", e);
            }
        }
        drop(self.profile.lock().await.take());
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.connection.is_active()
    }
}
