//! Common test utilities
//!
//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use locator_forge::extract::{ExtractorSettings, LocatorExtractor};
use locator_forge::session::mock::{MockPageScript, MockSessionManager};
use locator_forge::session::SessionManager;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Settings with budgets short enough for tests
pub fn fast_settings() -> ExtractorSettings {
    ExtractorSettings {
        navigation_timeout: Duration::from_millis(200),
        attribute_timeout: Duration::from_millis(100),
        ..ExtractorSettings::default()
    }
}

/// Extractor over a mock session manager driven by `script`
pub fn mock_extractor(
    script: MockPageScript,
    settings: ExtractorSettings,
) -> (Arc<MockSessionManager>, Arc<LocatorExtractor>) {
    let manager = Arc::new(MockSessionManager::new(script));
    let sessions: Arc<dyn SessionManager> = manager.clone();
    (manager, Arc::new(LocatorExtractor::new(sessions, settings)))
}

/// Page with `count` links, ids `link-0` onwards
pub fn many_links(count: usize) -> MockPageScript {
    (0..count).fold(MockPageScript::new(), |script, i| {
        let id = format!("link-{}", i);
        script.with("a", &[("id", id.as_str())])
    })
}

/// Serve a fixed HTML document on 127.0.0.1; the server stops when the
/// returned sender is dropped
pub async fn serve_html(
    html: &'static str,
) -> Result<(String, tokio::sync::oneshot::Sender<()>), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let Ok((stream, _)) = accepted else { break };
                    tokio::spawn(async move {
                        let service = service_fn(move |_req: Request<Incoming>| async move {
                            let mut response = Response::new(Full::new(Bytes::from_static(html.as_bytes())));
                            response.headers_mut().insert(
                                hyper::header::CONTENT_TYPE,
                                hyper::header::HeaderValue::from_static("text/html; charset=utf-8"),
                            );
                            Ok::<_, Infallible>(response)
                        });
                        let _ = http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .await;
                    });
                }
                _ = &mut shutdown_rx => break,
            }
        }
    });

    Ok((format!("http://{}/", addr), shutdown_tx))
}

/// Wait up to a second for `condition` to hold
pub async fn eventually<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
