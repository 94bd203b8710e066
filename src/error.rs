//! Unified error types for Locator-Forge

use std::net;
use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Locator-Forge
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network errors
    #[error("Network error: {0}")]
    Net(#[from] net::AddrParseError),

    /// WebSocket errors
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// gRPC errors
    #[error("gRPC error: {0}")]
    Grpc(#[from] Box<tonic::Status>),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL without an http/https scheme
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Rendering engine could not be started or attached
    #[error("Browser initialization failed: {0}")]
    BrowserInitFailure(String),

    /// Navigation did not reach DOM content within the budget
    #[error("Navigation timed out: {0}")]
    NavigationTimeout(String),

    /// Navigation failure reported by the engine
    #[error("Navigation failed: {0}")]
    NavigationError(String),

    /// Navigation failure of any other origin
    #[error("Unknown navigation error: {0}")]
    UnknownNavigationError(String),

    /// Selector query failed
    #[error("Element collection failed: {0}")]
    CollectionFailure(String),

    /// Attribute extraction failed for a single element
    #[error("Attribute extraction failed: {0}")]
    ExtractionFailed(String),

    /// Script execution failed
    #[error("Script execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// Page already released
    #[error("Page closed: {0}")]
    PageClosed(String),

    /// Timeout
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// Issue tracker errors
    #[error("Tracker error: {0}")]
    Tracker(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new WebSocket error
    pub fn websocket<S: Into<String>>(msg: S) -> Self {
        Error::WebSocket(msg.into())
    }

    /// Create a new CDP error
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Create a new invalid URL error
    pub fn invalid_url<S: Into<String>>(url: S) -> Self {
        Error::InvalidUrl(url.into())
    }

    /// Create a new browser init failure
    pub fn browser_init_failure<S: Into<String>>(msg: S) -> Self {
        Error::BrowserInitFailure(msg.into())
    }

    /// Create a new navigation timeout error
    pub fn navigation_timeout<S: Into<String>>(msg: S) -> Self {
        Error::NavigationTimeout(msg.into())
    }

    /// Create a new navigation error
    pub fn navigation_error<S: Into<String>>(msg: S) -> Self {
        Error::NavigationError(msg.into())
    }

    /// Create a new unknown navigation error
    pub fn unknown_navigation_error<S: Into<String>>(msg: S) -> Self {
        Error::UnknownNavigationError(msg.into())
    }

    /// Create a new collection failure
    pub fn collection_failure<S: Into<String>>(msg: S) -> Self {
        Error::CollectionFailure(msg.into())
    }

    /// Create a new extraction failure
    pub fn extraction_failed<S: Into<String>>(msg: S) -> Self {
        Error::ExtractionFailed(msg.into())
    }

    /// Create a new script execution failed error
    pub fn script_execution_failed<S: Into<String>>(msg: S) -> Self {
        Error::ScriptExecutionFailed(msg.into())
    }

    /// Create a new page closed error
    pub fn page_closed<S: Into<String>>(id: S) -> Self {
        Error::PageClosed(id.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Error::Timeout(msg.into())
    }

    /// Create a new tracker error
    pub fn tracker<S: Into<String>>(msg: S) -> Self {
        Error::Tracker(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Stable taxonomy name, used as `kind` in terminal records
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidUrl(_) => "InvalidUrl",
            Error::BrowserInitFailure(_) => "BrowserInitFailure",
            Error::NavigationTimeout(_) => "NavigationTimeout",
            Error::NavigationError(_) => "NavigationError",
            Error::UnknownNavigationError(_) => "UnknownNavigationError",
            Error::CollectionFailure(_) => "CollectionFailure",
            Error::ExtractionFailed(_) => "ExtractionFailed",
            Error::Tracker(_) => "TrackerError",
            Error::Configuration(_) => "ConfigurationError",
            Error::Timeout(_) => "Timeout",
            _ => "InternalError",
        }
    }
}

/// Convert Error to gRPC Status
impl From<Error> for tonic::Status {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidUrl(_) | Error::Configuration(_) => {
                tonic::Status::invalid_argument(err.to_string())
            }
            Error::NavigationTimeout(_) | Error::Timeout(_) => {
                tonic::Status::deadline_exceeded(err.to_string())
            }
            Error::BrowserInitFailure(_) => tonic::Status::unavailable(err.to_string()),
            Error::NavigationError(_)
            | Error::UnknownNavigationError(_)
            | Error::CollectionFailure(_) => tonic::Status::aborted(err.to_string()),
            Error::Tracker(_) => tonic::Status::failed_precondition(err.to_string()),
            Error::Grpc(status) => *status,
            _ => tonic::Status::internal(err.to_string()),
        }
    }
}
