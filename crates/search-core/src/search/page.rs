use serde::{Deserialize, Serialize};

use crate::image::ImageRef;

/// Counters describing one slice of the provider's result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub total_found: u64,
    pub fetched_count: u64,
    /// 1-based position of the first item in the slice.
    pub start_position: u32,
}

/// One decoded page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub items: Vec<ImageRef>,
    pub current: PageInfo,
    /// `None` when the provider reports no further pages.
    pub next: Option<PageInfo>,
}

impl SearchPage {
    /// Cursor for the following request, if there is one.
    pub fn next_page_cursor(&self) -> Option<u32> {
        self.next.map(|info| info.start_position)
    }
}
