//! HTTP health endpoint
//!
//! `GET /` answers with a fixed JSON payload so hosting platforms can probe the
//! process without speaking gRPC.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

type ResBody = Full<Bytes>;

/// Health payload, rendered once
#[derive(Debug, Clone)]
pub struct HealthStatus {
    body: Bytes,
}

impl HealthStatus {
    /// Payload advertising the gRPC endpoint
    pub fn new(grpc_endpoint: &str) -> Self {
        let payload = serde_json::json!({
            "status": "locator-forge is running",
            "grpc_endpoint": grpc_endpoint,
        });
        Self {
            body: Bytes::from(payload.to_string()),
        }
    }
}

fn json_response(status: StatusCode, body: Bytes) -> Response<ResBody> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Response for one request
pub fn route(method: &Method, path: &str, health: &HealthStatus) -> Response<ResBody> {
    match (method, path) {
        (&Method::GET, "/") => json_response(StatusCode::OK, health.body.clone()),
        (_, "/") => json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            Bytes::from_static(br#"{"error":"method not allowed"}"#),
        ),
        _ => json_response(
            StatusCode::NOT_FOUND,
            Bytes::from_static(br#"{"error":"not found"}"#),
        ),
    }
}

/// Serve the health endpoint on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, health: HealthStatus, shutdown: F) -> crate::Result<()>
where
    F: Future<Output = ()>,
{
    let health = Arc::new(health);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("Health endpoint accept failed: {}", e);
                        continue;
                    }
                };

                let health = Arc::clone(&health);
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let health = Arc::clone(&health);
                        async move { Ok::<_, Infallible>(route(req.method(), req.uri().path(), &health)) }
                    });

                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        debug!(peer = %peer, "Health connection error: {}", e);
                    }
                });
            }
            _ = &mut shutdown => {
                info!("Health endpoint stopped");
                return Ok(());
            }
        }
    }
}
