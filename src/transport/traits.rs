use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::query::QueryDocument;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Backend error (status {status}): {reason}")]
    Backend { status: u16, reason: String },
    #[error("Request timed out")]
    Timeout,
}

/// The two requests the query core needs from a search client.
///
/// Both return the raw JSON response body; [`crate::query::Processor`]
/// interprets it.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn search(&self, document: &QueryDocument) -> Result<Value, TransportError>;
    async fn count(&self, document: &QueryDocument) -> Result<Value, TransportError>;
}
