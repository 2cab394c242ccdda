use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use search_core::config::SearchConfig;
use search_core::ports::{HttpMethod, HttpRequest, TransportError, TransportPort};
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("imagesearch/", env!("CARGO_PKG_VERSION"));

/// [`TransportPort`] backed by a shared `reqwest::Client`.
///
/// The client-wide timeout covers connect, send and body read; elapsing it
/// yields [`TransportError::Timeout`].
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Connection(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, TransportError> {
        Self::new(config.request_timeout)
    }
}

#[async_trait]
impl TransportPort for ReqwestTransport {
    async fn perform(&self, request: HttpRequest) -> Result<Bytes, TransportError> {
        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
        };

        let response = builder
            .query(&request.params)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %request.url, status = status.as_u16(), "non-success response");
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        debug!(url = %request.url, bytes = body.len(), "response received");
        Ok(body)
    }
}

fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if let Some(status) = error.status() {
        TransportError::Status(status.as_u16())
    } else if error.is_builder() {
        TransportError::InvalidRequest(error.to_string())
    } else {
        TransportError::Connection(error.to_string())
    }
}
