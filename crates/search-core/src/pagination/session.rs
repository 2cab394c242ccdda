use std::ops::Range;

use crate::image::ImageRef;
use crate::search::SearchPage;

use super::state_machine::{PageOperation, PaginationState, RequestToken};

/// The page request currently allowed to change the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveRequest {
    pub token: RequestToken,
    pub operation: PageOperation,
}

/// Accumulated state of one search lifecycle, from one reload to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSession {
    pub(crate) items: Vec<ImageRef>,
    /// `None` means the provider has no more pages.
    pub(crate) next_page_cursor: Option<u32>,
    /// Text the session was loaded with; appends keep using it.
    pub(crate) search_text: Option<String>,
    pub(crate) active_request: Option<ActiveRequest>,
}

impl SearchSession {
    pub(crate) fn starting(search_text: Option<String>, active_request: ActiveRequest) -> Self {
        Self {
            items: Vec::new(),
            next_page_cursor: None,
            search_text,
            active_request: Some(active_request),
        }
    }

    pub fn items(&self) -> &[ImageRef] {
        &self.items
    }

    pub fn next_page_cursor(&self) -> Option<u32> {
        self.next_page_cursor
    }

    pub fn search_text(&self) -> Option<&str> {
        self.search_text.as_deref()
    }

    pub fn active_request(&self) -> Option<ActiveRequest> {
        self.active_request
    }

    pub(crate) fn replace_with(&mut self, page: SearchPage) {
        self.next_page_cursor = page.next_page_cursor();
        self.items = page.items;
    }

    /// Append the page's items, returning the insertion range.
    pub(crate) fn extend_with(&mut self, page: SearchPage) -> Range<usize> {
        let start = self.items.len();
        self.next_page_cursor = page.next_page_cursor();
        self.items.extend(page.items);
        start..self.items.len()
    }
}

/// Read-only projection of the session handed to the UI collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: PaginationState,
    pub items: Vec<ImageRef>,
    pub next_page_cursor: Option<u32>,
    pub search_text: Option<String>,
}

impl SessionSnapshot {
    pub fn has_more_pages(&self) -> bool {
        self.next_page_cursor.is_some()
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.state,
            PaginationState::Reloading | PaginationState::AppendingPage
        )
    }
}
