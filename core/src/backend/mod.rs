use crate::config::Config;
use crate::tools::{ToolRequest, ToolResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod http;
pub mod mock;

pub use http::HttpBackend;
pub use mock::MockBackend;

/// The security-assistant service, reached through its request/response contracts
#[async_trait]
pub trait Backend: Send + Sync {
    /// Perform one outbound call and decode the answer for its tool
    async fn send(&self, request: ToolRequest) -> Result<ToolResult, BackendError>;

    /// Get backend information
    fn info(&self) -> BackendInfo;
}

/// Information about a backend
#[derive(Debug, Clone)]
pub struct BackendInfo {
    pub name: String,
    pub description: String,
    pub endpoint: String,
}

/// Failures below the application level: the call never produced a
/// well-formed answer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error! status: {status}")]
    Status { status: u16 },

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,

    #[error("Backend configuration error: {0}")]
    Configuration(String),
}

/// Factory for creating the configured backend
pub struct BackendFactory;

impl BackendFactory {
    /// HTTP backend against `config.base_url`
    pub fn create_http(config: &Config) -> Result<Arc<dyn Backend>, BackendError> {
        let backend = HttpBackend::new(config.base_url.clone(), config.request_timeout)?;
        Ok(Arc::new(backend))
    }

    /// Canned offline backend
    pub fn create_mock() -> Arc<dyn Backend> {
        Arc::new(MockBackend::new())
    }
}
