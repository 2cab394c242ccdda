use bytes::Bytes;

use super::errors::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

/// A transport-agnostic HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    /// Query string parameters, in order.
    pub params: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw HTTP transport.
///
/// Implementations return the response body for 2xx responses and a
/// [`TransportError`] for everything else. Timeouts are the implementation's
/// concern. Dropping the returned future cancels the request.
#[async_trait::async_trait]
pub trait TransportPort: Send + Sync {
    async fn perform(&self, request: HttpRequest) -> Result<Bytes, TransportError>;
}
