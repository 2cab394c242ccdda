use thiserror::Error;

/// Error taxonomy shared by every layer of the search core.
///
/// Cloneable so the same failure can be forwarded to several listeners.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Transport failure, non-success status or timeout.
    #[error("network error: {0}")]
    Network(String),

    /// Malformed envelope, unparseable numeric field or undecodable image bytes.
    #[error("decode error: {0}")]
    Decode(String),

    /// Malformed query construction.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Failures reported by the HTTP transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("unexpected status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<TransportError> for SearchError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::InvalidRequest(msg) => SearchError::InvalidRequest(msg),
            other => SearchError::Network(other.to_string()),
        }
    }
}
