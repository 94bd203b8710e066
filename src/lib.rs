//! Locator-Forge: locator extraction microservice
//!
//! Loads a page in headless Chrome over the DevTools Protocol and turns its
//! likely test targets into ranked locator candidates, streamed over gRPC.

pub mod error;
pub mod config;

pub mod cdp;
pub mod session;
pub mod extract;
pub mod tracker;
pub mod services;

// Re-exports
pub use error::{Error, Result};

// Generated protobuf modules
#[allow(clippy::large_enum_variant)]
pub mod locator_forge {
    pub mod v1 {
        tonic::include_proto!("locator.forge.v1");
    }
}

/// Locator-Forge library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
