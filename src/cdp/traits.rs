//! CDP (Chrome DevTools Protocol) layer traits
//!
//! This module defines the abstract interfaces for CDP communication.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// CDP event representation
#[derive(Debug, Clone)]
pub struct CdpEvent {
    /// Event method (e.g., "Fetch.requestPaused")
    pub method: String,
    /// Event parameters
    pub params: Value,
    /// Session ID (for multi-session targets)
    pub session_id: Option<String>,
}

/// CDP response representation
#[derive(Debug, Clone)]
pub struct CdpResponse {
    /// Response ID (matches request ID)
    pub id: u64,
    /// Response result
    pub result: Option<Value>,
    /// Error if any
    pub error: Option<CdpError>,
}

/// CDP error representation
#[derive(Debug, Clone)]
pub struct CdpError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    pub data: Option<Value>,
}

/// CDP connection trait
///
/// Represents a WebSocket connection to a Chrome DevTools Protocol target.
#[async_trait]
pub trait CdpConnection: Send + Sync + std::fmt::Debug {
    /// Send a CDP command and wait for response
    async fn send_command(
        &self,
        method: &str,
        params: Value,
    ) -> Result<CdpResponse, crate::Error>;

    /// Subscribe to CDP events
    async fn listen_events(&self) -> Result<tokio::sync::mpsc::Receiver<CdpEvent>, crate::Error>;

    /// Close the connection
    async fn close(&self) -> Result<(), crate::Error>;

    /// Check if connection is active
    fn is_active(&self) -> bool;
}

/// CDP client trait
///
/// Page-level client with typed methods for the operations the extractor needs.
#[async_trait]
pub trait CdpClient: Send + Sync + std::fmt::Debug {
    /// Get the underlying connection
    fn connection(&self) -> Arc<dyn CdpConnection>;

    /// Start a navigation; returns once the engine has committed or rejected it
    async fn navigate(&self, url: &str) -> Result<NavigationResult, crate::Error>;

    /// Current `document.readyState`
    async fn ready_state(&self) -> Result<String, crate::Error>;

    /// Evaluate JavaScript in the page, returning the value
    async fn evaluate(&self, script: &str, await_promise: bool) -> Result<EvaluationResult, crate::Error>;

    /// Evaluate JavaScript in the page, returning a remote handle in `object_group`
    async fn evaluate_handle(&self, script: &str, object_group: &str) -> Result<Option<String>, crate::Error>;

    /// Own properties of a remote object as `(name, object_id)` pairs
    async fn get_properties(&self, object_id: &str) -> Result<Vec<(String, Option<String>)>, crate::Error>;

    /// Call `function` with `this` bound to `object_id`, returning the value
    async fn call_function_on(
        &self,
        object_id: &str,
        function: &str,
        args: Vec<Value>,
    ) -> Result<Value, crate::Error>;

    /// Release all remote objects in a group
    async fn release_object_group(&self, object_group: &str) -> Result<(), crate::Error>;

    /// Enable a domain
    async fn enable_domain(&self, domain: &str) -> Result<(), crate::Error>;

    /// Call a raw CDP method (returns JSON Value)
    async fn call_method(&self, method: &str, params: Value) -> Result<Value, crate::Error>;

    /// Subscribe to events (returns a receiver)
    async fn subscribe_events(&self, event_type: &str) -> Result<tokio::sync::mpsc::Receiver<CdpEvent>, crate::Error>;
}

/// Navigation result
#[derive(Debug, Clone)]
pub struct NavigationResult {
    /// Frame that navigated
    pub frame_id: String,
    /// URL requested
    pub url: String,
    /// Engine-reported failure, if any
    pub error_text: Option<String>,
}

/// JavaScript evaluation result
#[derive(Debug, Clone)]
pub enum EvaluationResult {
    /// String value
    String(String),
    /// Number value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Null value
    Null,
    /// Object/Array (as JSON)
    Object(Value),
}

/// CDP browser trait
///
/// Controls browser-level operations via CDP.
#[async_trait]
pub trait CdpBrowser: Send + Sync + std::fmt::Debug {
    /// Browser-level DevTools WebSocket URL
    fn ws_endpoint(&self) -> &str;

    /// Create an isolated browser context (own cookies and storage)
    async fn create_browser_context(&self) -> Result<String, crate::Error>;

    /// Create a page target, optionally inside a browser context; returns the target id
    async fn create_target(&self, url: &str, browser_context_id: Option<&str>) -> Result<String, crate::Error>;

    /// Connect a page-level client to a target
    async fn create_client(&self, target_id: &str) -> Result<Arc<dyn CdpClient>, crate::Error>;

    /// Close a page target
    async fn close_target(&self, target_id: &str) -> Result<(), crate::Error>;

    /// Dispose a browser context and everything in it
    async fn dispose_browser_context(&self, browser_context_id: &str) -> Result<(), crate::Error>;

    /// Get browser version
    async fn get_version(&self) -> Result<BrowserVersion, crate::Error>;

    /// Close the browser
    async fn close(&self) -> Result<(), crate::Error>;

    /// Whether the browser-level connection is still usable
    fn is_active(&self) -> bool;
}

/// Browser version information
#[derive(Debug, Clone)]
pub struct BrowserVersion {
    /// Protocol version
    pub protocol_version: String,
    /// Product name
    pub product: String,
    /// User agent
    pub user_agent: String,
    /// JavaScript engine version
    pub js_version: String,
}
