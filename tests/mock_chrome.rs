//! Mock Chrome DevTools Protocol server
//!
//! Speaks just enough CDP over a real WebSocket for the locator pipeline to run
//! end to end without a Chrome binary.

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Error text reported by `Page.navigate` for hosts containing "unreachable"
pub const UNREACHABLE_ERROR: &str = "net::ERR_NAME_NOT_RESOLVED";

#[derive(Debug, Default)]
struct MockChromeState {
    /// Attribute objects returned by `Runtime.callFunctionOn`, in document order
    elements: Vec<Value>,
    /// Every command received, in arrival order
    commands: Vec<(String, Value)>,
    /// Resource type announced in `Fetch.requestPaused` after `Fetch.enable`
    paused_resource: Option<String>,
}

/// Mock Chrome server
pub struct MockChromeServer {
    addr: String,
    state: Arc<Mutex<MockChromeState>>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockChromeServer {
    /// Start a server whose pages contain `elements`
    pub async fn start(elements: Vec<Value>) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(MockChromeState {
            elements,
            ..MockChromeState::default()
        }));

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let server_state = Arc::clone(&state);
        let counter = Arc::new(AtomicU32::new(0));

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, peer_addr)) => {
                                tracing::info!("Mock Chrome: Connection from {}", peer_addr);
                                tokio::spawn(Self::handle_connection(
                                    stream,
                                    Arc::clone(&server_state),
                                    Arc::clone(&counter),
                                ));
                            }
                            Err(e) => {
                                tracing::error!("Mock Chrome: Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("Mock Chrome: Shutdown signal received");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            addr: format!("ws://{}", addr),
            state,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Announce a paused request of `resource_type` whenever interception is enabled
    pub async fn pause_requests_of(&self, resource_type: &str) {
        self.state.lock().await.paused_resource = Some(resource_type.to_string());
    }

    /// Browser-level WebSocket URL
    pub fn ws_endpoint(&self) -> String {
        format!("{}/devtools/browser/mock", self.addr)
    }

    /// Commands received so far
    pub async fn commands(&self) -> Vec<(String, Value)> {
        self.state.lock().await.commands.clone()
    }

    /// Names of the commands received so far
    pub async fn methods(&self) -> Vec<String> {
        self.commands().await.into_iter().map(|(method, _)| method).collect()
    }

    /// Handle a WebSocket connection
    async fn handle_connection(stream: TcpStream, state: Arc<Mutex<MockChromeState>>, counter: Arc<AtomicU32>) {
        let ws_stream = match accept_async(stream).await {
            Ok(ws_stream) => ws_stream,
            Err(e) => {
                tracing::error!("Mock Chrome: WebSocket handshake error: {}", e);
                return;
            }
        };
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        while let Some(result) = ws_receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    let Ok(req) = serde_json::from_str::<Value>(&text) else {
                        continue;
                    };
                    for reply in Self::create_cdp_replies(&req, &state, &counter).await {
                        if ws_sender.send(Message::Text(reply.to_string())).await.is_err() {
                            return;
                        }
                    }
                }
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    tracing::debug!("Mock Chrome: WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    }

    /// Response to one command, followed by any events it triggers
    async fn create_cdp_replies(
        req: &Value,
        state: &Mutex<MockChromeState>,
        counter: &AtomicU32,
    ) -> Vec<Value> {
        let method = req.get("method").and_then(|m| m.as_str()).unwrap_or("unknown");
        let id = req.get("id").and_then(|i| i.as_u64()).unwrap_or(0);
        let params = req.get("params").cloned().unwrap_or(Value::Null);

        let mut state = state.lock().await;
        state.commands.push((method.to_string(), params.clone()));

        let mut events = Vec::new();
        let result = match method {
            "Target.createBrowserContext" => {
                json!({ "browserContextId": format!("CTX-{}", counter.fetch_add(1, Ordering::SeqCst)) })
            }
            "Target.createTarget" => {
                json!({ "targetId": format!("T-{}", counter.fetch_add(1, Ordering::SeqCst)) })
            }
            "Target.closeTarget" => json!({ "success": true }),
            "Browser.getVersion" => json!({
                "protocolVersion": "1.3",
                "product": "HeadlessChrome/120.0.6099.109",
                "userAgent": "Mozilla/5.0 (Test)",
                "jsVersion": "12.0"
            }),
            "Page.navigate" => {
                let url = params.get("url").and_then(|u| u.as_str()).unwrap_or_default();
                if url.contains("unreachable") {
                    json!({ "frameId": "F-1", "errorText": UNREACHABLE_ERROR })
                } else {
                    json!({ "frameId": "F-1", "loaderId": "L-1" })
                }
            }
            "Runtime.evaluate" => {
                let expression = params.get("expression").and_then(|e| e.as_str()).unwrap_or_default();
                if expression == "document.readyState" {
                    json!({ "result": { "type": "string", "value": "interactive" } })
                } else if expression.contains("querySelectorAll") {
                    json!({ "result": { "type": "object", "subtype": "array", "objectId": "list-1" } })
                } else {
                    json!({ "result": { "type": "undefined" } })
                }
            }
            "Runtime.getProperties" => {
                let mut properties: Vec<Value> = (0..state.elements.len())
                    .map(|i| {
                        json!({
                            "name": i.to_string(),
                            "value": { "type": "object", "subtype": "node", "objectId": format!("el-{}", i) }
                        })
                    })
                    .collect();
                properties.push(json!({
                    "name": "length",
                    "value": { "type": "number", "value": state.elements.len() }
                }));
                json!({ "result": properties })
            }
            "Runtime.callFunctionOn" => {
                let element = params
                    .get("objectId")
                    .and_then(|o| o.as_str())
                    .and_then(|o| o.strip_prefix("el-"))
                    .and_then(|i| i.parse::<usize>().ok())
                    .and_then(|i| state.elements.get(i).cloned())
                    .unwrap_or(Value::Null);
                json!({ "result": { "type": "object", "value": element } })
            }
            "Fetch.enable" => {
                if let Some(resource_type) = &state.paused_resource {
                    events.push(json!({
                        "method": "Fetch.requestPaused",
                        "params": {
                            "requestId": "interception-1",
                            "resourceType": resource_type,
                            "request": { "url": "https://example.com/hero.png", "method": "GET" }
                        }
                    }));
                }
                json!({})
            }
            "Page.enable"
            | "Runtime.enable"
            | "Runtime.releaseObjectGroup"
            | "Target.disposeBrowserContext"
            | "Fetch.continueRequest"
            | "Fetch.failRequest"
            | "Browser.close" => json!({}),
            _ => {
                return vec![json!({
                    "id": id,
                    "error": {
                        "code": -32601,
                        "message": format!("Method not implemented: {}", method)
                    }
                })]
            }
        };

        let mut replies = vec![json!({ "id": id, "result": result })];
        replies.extend(events);
        replies
    }
}

impl Drop for MockChromeServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_chrome_startup() {
        let server = MockChromeServer::start(Vec::new()).await.unwrap();
        assert!(server.ws_endpoint().starts_with("ws://127.0.0.1:"));
        assert!(server.ws_endpoint().ends_with("/devtools/browser/mock"));
    }

    #[tokio::test]
    async fn test_unknown_method_is_an_error() {
        let state = Mutex::new(MockChromeState::default());
        let replies = MockChromeServer::create_cdp_replies(
            &json!({ "id": 7, "method": "DOM.getDocument" }),
            &state,
            &AtomicU32::new(0),
        )
        .await;

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["id"], 7);
        assert_eq!(replies[0]["error"]["code"], -32601);
    }
}
