//! Mock CDP implementation for testing
//!
//! Scriptable stand-ins for the connection and browser traits. Responses can be
//! overridden per method, failures injected, and events pushed to subscribers.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::cdp::client::CdpClientImpl;
use crate::cdp::traits::*;
use crate::Error;

/// Mock CDP connection
#[derive(Debug)]
pub struct MockCdpConnection {
    is_active: Arc<AtomicBool>,
    next_id: AtomicU64,
    overrides: Mutex<HashMap<String, serde_json::Value>>,
    failures: Mutex<HashMap<String, String>>,
    sent: Mutex<Vec<(String, serde_json::Value)>>,
    subscribers: Mutex<Vec<tokio::sync::mpsc::UnboundedSender<CdpEvent>>>,
}

impl MockCdpConnection {
    /// Create a new mock CDP connection
    pub fn new() -> Self {
        Self {
            is_active: Arc::new(AtomicBool::new(true)),
            next_id: AtomicU64::new(1),
            overrides: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Answer `method` with `result` from now on
    pub async fn respond_with(&self, method: &str, result: serde_json::Value) {
        self.overrides.lock().await.insert(method.to_string(), result);
    }

    /// Fail `method` with a CDP error from now on
    pub async fn fail_with(&self, method: &str, message: &str) {
        self.failures.lock().await.insert(method.to_string(), message.to_string());
    }

    /// Commands sent so far, oldest first
    pub async fn sent_commands(&self) -> Vec<(String, serde_json::Value)> {
        self.sent.lock().await.clone()
    }

    /// Push an event to every subscriber
    pub async fn emit(&self, method: &str, params: serde_json::Value) {
        let event = CdpEvent {
            method: method.to_string(),
            params,
            session_id: None,
        };
        self.subscribers
            .lock()
            .await
            .retain(|sender| sender.send(event.clone()).is_ok());
    }

    fn default_result(method: &str, params: &serde_json::Value) -> serde_json::Value {
        match method {
            "Page.navigate" => serde_json::json!({
                "frameId": uuid::Uuid::new_v4().to_string(),
                "loaderId": uuid::Uuid::new_v4().to_string(),
            }),
            "Runtime.evaluate" => {
                if params.get("returnByValue").and_then(|v| v.as_bool()) == Some(false) {
                    serde_json::json!({ "result": { "type": "object", "objectId": "mock-object" } })
                } else {
                    serde_json::json!({ "result": { "type": "string", "value": "complete" } })
                }
            }
            "Runtime.getProperties" => serde_json::json!({ "result": [] }),
            "Runtime.callFunctionOn" => serde_json::json!({ "result": { "type": "object", "value": {} } }),
            "Target.createBrowserContext" => serde_json::json!({
                "browserContextId": uuid::Uuid::new_v4().to_string(),
            }),
            "Target.createTarget" => serde_json::json!({
                "targetId": uuid::Uuid::new_v4().to_string(),
            }),
            "Browser.getVersion" => serde_json::json!({
                "protocolVersion": "1.3",
                "product": "HeadlessChrome/120.0.0.0",
                "userAgent": "Mozilla/5.0 HeadlessChrome/120.0.0.0",
                "jsVersion": "12.0.0.0",
            }),
            _ => serde_json::json!({}),
        }
    }
}

impl Default for MockCdpConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdpConnection for MockCdpConnection {
    async fn send_command(&self, method: &str, params: serde_json::Value) -> Result<CdpResponse, Error> {
        if !self.is_active.load(Ordering::Relaxed) {
            return Err(Error::websocket("Connection is not active"));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sent.lock().await.push((method.to_string(), params.clone()));

        if let Some(message) = self.failures.lock().await.get(method) {
            return Err(Error::cdp(format!("{}: {} (code: -32000)", method, message)));
        }

        let result = match self.overrides.lock().await.get(method) {
            Some(result) => result.clone(),
            None => Self::default_result(method, &params),
        };

        Ok(CdpResponse {
            id,
            result: Some(result),
            error: None,
        })
    }

    async fn listen_events(&self) -> Result<tokio::sync::mpsc::Receiver<CdpEvent>, Error> {
        if !self.is_active.load(Ordering::Relaxed) {
            return Err(Error::websocket("Connection is not active"));
        }

        let (tx, rx) = tokio::sync::mpsc::channel(100);
        let (unbounded_tx, mut unbounded_rx) = tokio::sync::mpsc::unbounded_channel();
        self.subscribers.lock().await.push(unbounded_tx);

        tokio::spawn(async move {
            while let Some(event) = unbounded_rx.recv().await {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }

    async fn close(&self) -> Result<(), Error> {
        self.is_active.store(false, Ordering::Relaxed);
        self.subscribers.lock().await.clear();
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Relaxed)
    }
}

/// Mock CDP browser
///
/// Every page client shares one [`MockCdpConnection`] so tests can script it.
#[derive(Debug)]
pub struct MockCdpBrowser {
    connection: Arc<MockCdpConnection>,
    page_connection: Arc<MockCdpConnection>,
    closed_targets: Mutex<Vec<String>>,
    live_contexts: Mutex<HashSet<String>>,
}

impl MockCdpBrowser {
    /// Create a new mock CDP browser
    pub fn new() -> Self {
        Self::with_page_connection(Arc::new(MockCdpConnection::new()))
    }

    /// Create a mock browser whose pages talk to `page_connection`
    pub fn with_page_connection(page_connection: Arc<MockCdpConnection>) -> Self {
        Self {
            connection: Arc::new(MockCdpConnection::new()),
            page_connection,
            closed_targets: Mutex::new(Vec::new()),
            live_contexts: Mutex::new(HashSet::new()),
        }
    }

    /// Browser-level connection
    pub fn browser_connection(&self) -> Arc<MockCdpConnection> {
        Arc::clone(&self.connection)
    }

    /// Target ids closed so far
    pub async fn closed_targets(&self) -> Vec<String> {
        self.closed_targets.lock().await.clone()
    }

    /// Browser contexts created and not yet disposed
    pub async fn live_context_count(&self) -> usize {
        self.live_contexts.lock().await.len()
    }
}

impl Default for MockCdpBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdpBrowser for MockCdpBrowser {
    fn ws_endpoint(&self) -> &str {
        "ws://127.0.0.1:9222/devtools/browser/mock"
    }

    async fn create_browser_context(&self) -> Result<String, Error> {
        let result = self
            .connection
            .send_command("Target.createBrowserContext", serde_json::json!({}))
            .await?;
        let context_id = result
            .result
            .and_then(|r| r.get("browserContextId").and_then(|v| v.as_str()).map(String::from))
            .ok_or_else(|| Error::cdp("Missing browserContextId in response"))?;
        self.live_contexts.lock().await.insert(context_id.clone());
        Ok(context_id)
    }

    async fn create_target(&self, url: &str, browser_context_id: Option<&str>) -> Result<String, Error> {
        let result = self
            .connection
            .send_command(
                "Target.createTarget",
                serde_json::json!({ "url": url, "browserContextId": browser_context_id }),
            )
            .await?;
        result
            .result
            .and_then(|r| r.get("targetId").and_then(|v| v.as_str()).map(String::from))
            .ok_or_else(|| Error::cdp("Missing targetId in response"))
    }

    async fn create_client(&self, _target_id: &str) -> Result<Arc<dyn CdpClient>, Error> {
        if !self.connection.is_active() {
            return Err(Error::cdp("Browser is closed"));
        }
        Ok(Arc::new(CdpClientImpl::new(self.page_connection.clone())))
    }

    async fn close_target(&self, target_id: &str) -> Result<(), Error> {
        self.closed_targets.lock().await.push(target_id.to_string());
        Ok(())
    }

    async fn dispose_browser_context(&self, browser_context_id: &str) -> Result<(), Error> {
        self.live_contexts.lock().await.remove(browser_context_id);
        Ok(())
    }

    async fn get_version(&self) -> Result<BrowserVersion, Error> {
        let result = self
            .connection
            .send_command("Browser.getVersion", serde_json::json!({}))
            .await?
            .result
            .unwrap_or_default();
        let field = |name: &str| {
            result
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
        self.connection.close().await
    }

    fn is_active(&self) -> bool {
        self.connection.is_active()
    }
}
