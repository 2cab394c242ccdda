//! Provider wire contract (Google Custom Search JSON envelope).
//!
//! ```text
//! {
//!   "queries": {
//!     "request":  [{ "totalResults": "42", "count": 10, "startIndex": 1 }],
//!     "nextPage": [{ "totalResults": "42", "count": 10, "startIndex": 11 }]
//!   },
//!   "items": [{ "title": "...", "link": "...", "image": { "thumbnailLink": "..." } }]
//! }
//! ```
//!
//! `totalResults` is a numeric string. `nextPage` is absent on the last page,
//! and `items` is absent when nothing matched.

use serde::Deserialize;
use url::Url;

use crate::image::ImageRef;
use crate::ports::errors::SearchError;
use crate::search::page::{PageInfo, SearchPage};

#[derive(Debug, Deserialize)]
struct Envelope {
    queries: Queries,
    #[serde(default)]
    items: Vec<WireItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Queries {
    #[serde(default)]
    request: Vec<WirePageInfo>,
    #[serde(default)]
    next_page: Vec<WirePageInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePageInfo {
    total_results: String,
    count: u64,
    start_index: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireItem {
    title: Option<String>,
    link: Option<String>,
    image: Option<WireImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireImage {
    thumbnail_link: Option<String>,
}

impl TryFrom<WirePageInfo> for PageInfo {
    type Error = SearchError;

    fn try_from(wire: WirePageInfo) -> Result<Self, Self::Error> {
        let total_found = wire.total_results.trim().parse::<u64>().map_err(|_| {
            SearchError::Decode(format!(
                "totalResults is not an integer: {:?}",
                wire.total_results
            ))
        })?;

        if wire.start_index < 1 {
            return Err(SearchError::Decode(format!(
                "startIndex must be >= 1, got {}",
                wire.start_index
            )));
        }

        Ok(PageInfo {
            total_found,
            fetched_count: wire.count,
            start_position: wire.start_index,
        })
    }
}

impl TryFrom<WireItem> for ImageRef {
    type Error = SearchError;

    fn try_from(item: WireItem) -> Result<Self, Self::Error> {
        let raw = item
            .image
            .and_then(|image| image.thumbnail_link)
            .or(item.link)
            .ok_or_else(|| SearchError::Decode("item has neither thumbnailLink nor link".into()))?;

        let source_url = Url::parse(&raw)
            .map_err(|e| SearchError::Decode(format!("invalid item url {raw:?}: {e}")))?;

        let image = ImageRef::new(source_url);
        Ok(match item.title {
            Some(title) => image.with_title(title),
            None => image,
        })
    }
}

/// Decode a provider response body into a [`SearchPage`].
///
/// Each item receives a freshly minted id.
pub fn decode_search_page(body: &[u8]) -> Result<SearchPage, SearchError> {
    let envelope: Envelope = serde_json::from_slice(body)
        .map_err(|e| SearchError::Decode(format!("malformed search envelope: {e}")))?;

    let current = envelope
        .queries
        .request
        .into_iter()
        .next()
        .ok_or_else(|| SearchError::Decode("queries.request is empty".into()))?
        .try_into()?;

    let next = envelope
        .queries
        .next_page
        .into_iter()
        .next()
        .map(PageInfo::try_from)
        .transpose()?;

    let items = envelope
        .items
        .into_iter()
        .map(ImageRef::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SearchPage {
        items,
        current,
        next,
    })
}
