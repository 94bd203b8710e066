//! Issue tracker integration tests
//!
//! Runs the Jira client against a local HTTP server that mimics the REST API.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use locator_forge::tracker::JiraClient;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Requests seen by the mock, as (path, authorization header)
type Seen = Arc<Mutex<Vec<(String, Option<String>)>>>;

fn jira_response(req: &Request<Incoming>) -> Response<Full<Bytes>> {
    let (status, body) = match req.uri().path() {
        "/rest/api/3/issue/PROJ-1" => (
            StatusCode::OK,
            json!({
                "key": "PROJ-1",
                "fields": {
                    "summary": "Login",
                    "customfield_10041": "Given a registered user, when they sign in, then the dashboard opens"
                }
            })
            .to_string(),
        ),
        "/rest/api/3/issue/PROJ-2" => (
            StatusCode::OK,
            json!({ "key": "PROJ-2", "fields": { "summary": "No criteria" } }).to_string(),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            json!({ "errorMessages": ["Issue does not exist or you do not have permission to see it."] })
                .to_string(),
        ),
    };

    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
}

async fn start_jira() -> (String, Seen) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));

    let server_seen = Arc::clone(&seen);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let seen = Arc::clone(&server_seen);
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let seen = Arc::clone(&seen);
                    async move {
                        let auth = req
                            .headers()
                            .get(hyper::header::AUTHORIZATION)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        seen.lock().await.push((req.uri().path().to_string(), auth));
                        Ok::<_, Infallible>(jira_response(&req))
                    }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    (format!("http://{}", addr), seen)
}

#[tokio::test]
async fn test_acceptance_criteria_from_field() {
    let (base_url, seen) = start_jira().await;
    let client = JiraClient::new(base_url.as_str(), "qa@example.com", "secret", "customfield_10041");

    let criteria = client.acceptance_criteria("PROJ-1").await.unwrap();
    assert_eq!(criteria.issue, "PROJ-1");
    assert_eq!(
        criteria.acceptance_criteria,
        json!("Given a registered user, when they sign in, then the dashboard opens")
    );

    let seen = seen.lock().await;
    assert_eq!(seen[0].0, "/rest/api/3/issue/PROJ-1");
    // base64("qa@example.com:secret")
    assert_eq!(seen[0].1.as_deref(), Some("Basic cWFAZXhhbXBsZS5jb206c2VjcmV0"));
}

#[tokio::test]
async fn test_missing_field_is_null() {
    let (base_url, _seen) = start_jira().await;
    let client = JiraClient::new(base_url.as_str(), "qa@example.com", "secret", "customfield_10041");

    let criteria = client.acceptance_criteria("PROJ-2").await.unwrap();
    assert_eq!(criteria.acceptance_criteria, serde_json::Value::Null);
}

#[tokio::test]
async fn test_unknown_issue_reports_status() {
    let (base_url, _seen) = start_jira().await;
    let client = JiraClient::new(base_url.as_str(), "qa@example.com", "secret", "description");

    let err = client.acceptance_criteria("NOPE-9").await.unwrap_err();
    assert_eq!(err.kind(), "TrackerError");
    let message = err.to_string();
    assert!(message.contains("Failed: 404"), "{}", message);
    assert!(message.contains("Issue does not exist"), "{}", message);
}

#[tokio::test]
async fn test_issue_id_is_path_encoded() {
    let (base_url, seen) = start_jira().await;
    let client = JiraClient::new(format!("{}/", base_url).as_str(), "qa@example.com", "secret", "description");

    let _ = client.acceptance_criteria("PROJ 1/../x").await;
    assert_eq!(seen.lock().await[0].0, "/rest/api/3/issue/PROJ%201%2F..%2Fx");
}
