use std::sync::Arc;

use async_trait::async_trait;
use search_core::config::ProviderConfig;
use search_core::ports::{HttpRequest, SearchError, SearchPagePort, TransportPort};
use search_core::search::{decode_search_page, SearchPage, SearchQuery};
use tracing::{debug, info_span, warn, Instrument};

/// Issues one paginated search request and decodes the provider envelope.
///
/// 发起一次分页搜索请求并解码结果。
///
/// Stateless: the controller owns all sequencing decisions. Errors are
/// surfaced as-is and never retried here.
pub struct SearchClient {
    transport: Arc<dyn TransportPort>,
    provider: ProviderConfig,
}

impl SearchClient {
    pub fn new(transport: Arc<dyn TransportPort>, provider: ProviderConfig) -> Self {
        Self {
            transport,
            provider,
        }
    }

    /// Build the wire request for `query`.
    pub fn build_request(&self, query: &SearchQuery) -> HttpRequest {
        HttpRequest::get(self.provider.endpoint.clone()).with_params(query.to_params(&self.provider))
    }
}

#[async_trait]
impl SearchPagePort for SearchClient {
    async fn fetch_page(&self, query: &SearchQuery) -> Result<SearchPage, SearchError> {
        let span = info_span!(
            "app.search_client.fetch_page",
            cursor = query.page_cursor(),
            page_size = query.page_size(),
            has_text = query.search_text().is_some(),
        );

        async {
            let request = self.build_request(query);
            let body = self.transport.perform(request).await.map_err(|err| {
                warn!(error = %err, "search request failed");
                SearchError::from(err)
            })?;

            let page = decode_search_page(&body).inspect_err(|err| {
                warn!(error = %err, bytes = body.len(), "search response rejected");
            })?;

            debug!(
                items = page.items.len(),
                total_found = page.current.total_found,
                next_cursor = ?page.next_page_cursor(),
                "search page decoded"
            );
            Ok::<_, SearchError>(page)
        }
        .instrument(span)
        .await
    }
}
