use crate::search::{SearchPage, SearchQuery};

use super::errors::SearchError;

/// Fetches one page of search results.
///
/// Stateless: every call returns a fresh page and never touches session state.
#[async_trait::async_trait]
pub trait SearchPagePort: Send + Sync {
    async fn fetch_page(&self, query: &SearchQuery) -> Result<SearchPage, SearchError>;
}
