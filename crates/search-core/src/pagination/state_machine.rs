//! Pagination state machine.
//!
//! Defines a pure transition function for the browse flow. The machine owns
//! the [`SearchSession`] exclusively; callers feed it [`PaginationInput`]s and
//! execute the [`PaginationAction`]s it returns.

use std::fmt::{Display, Formatter};
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::config::{SearchConfig, DEFAULT_PREFETCH_DISTANCE};
use crate::image::ImageRef;
use crate::ports::errors::SearchError;
use crate::search::{QueryBuilder, SearchPage, SearchQuery};

use super::session::{ActiveRequest, SearchSession, SessionSnapshot};

/// Browse flow state.
///
/// 浏览流程状态。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationState {
    /// No data loaded yet (or the first reload failed).
    #[default]
    Idle,
    /// First page of a new session is in flight.
    Reloading,
    /// Session holds data; no request in flight.
    Loaded,
    /// Next page is in flight.
    AppendingPage,
}

/// Which kind of page request an action or event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageOperation {
    Reload,
    Append,
}

/// Identifies one page request. Responses carrying any token other than the
/// active one are stale and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for RequestToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Identifies one scheduled debounce. Only the latest one may fire a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebounceToken(u64);

impl DebounceToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Inputs that drive the browse flow.
///
/// 驱动浏览流程的输入。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationInput {
    /// Reload right away with the latest search text.
    ReloadRequested,
    /// User edited the search text.
    SearchTextChanged { text: String },
    /// The debounce timer fired.
    DebounceElapsed { token: DebounceToken },
    /// Scroll reached the bottom.
    NextPageRequested,
    /// The item at `index` became visible.
    ItemVisible { index: usize },
    PageSucceeded { token: RequestToken, page: SearchPage },
    PageFailed { token: RequestToken, error: SearchError },
    /// Owner is going away.
    Shutdown,
}

/// Notifications for the UI collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationEvent {
    /// The item list was replaced wholesale.
    Reset { items: Vec<ImageRef> },
    /// `count` items were inserted at `range`.
    Appended { range: Range<usize>, count: usize },
    LoadingChanged { operation: PageOperation, loading: bool },
    Failed { operation: PageOperation, error: SearchError },
}

/// Side-effects produced by transitions.
///
/// 状态迁移产生的副作用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationAction {
    /// (Re)start the debounce timer; it reports back with `token`.
    ScheduleDebounce { token: DebounceToken },
    CancelDebounce,
    /// Abort the transport work behind `token`.
    CancelRequest { token: RequestToken },
    FetchPage {
        token: RequestToken,
        operation: PageOperation,
        query: SearchQuery,
    },
    Notify(PaginationEvent),
}

/// Pure pagination state machine.
#[derive(Debug, Clone)]
pub struct PaginationStateMachine {
    state: PaginationState,
    session: SearchSession,
    /// Session to restore if the reload in flight fails.
    last_good: Option<SearchSession>,
    /// Latest text typed by the user; the next reload uses it.
    search_text: Option<String>,
    pending_debounce: Option<DebounceToken>,
    query_builder: QueryBuilder,
    prefetch_distance: usize,
    next_request: u64,
    next_debounce: u64,
}

impl Default for PaginationStateMachine {
    fn default() -> Self {
        Self::new(QueryBuilder::default(), DEFAULT_PREFETCH_DISTANCE)
    }
}

impl PaginationStateMachine {
    pub fn new(query_builder: QueryBuilder, prefetch_distance: usize) -> Self {
        Self {
            state: PaginationState::Idle,
            session: SearchSession::default(),
            last_good: None,
            search_text: None,
            pending_debounce: None,
            query_builder,
            prefetch_distance,
            next_request: 0,
            next_debounce: 0,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(QueryBuilder::from_config(config), config.prefetch_distance)
    }

    /// Seed the text used by the first reload.
    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            items: self.session.items.clone(),
            next_page_cursor: self.session.next_page_cursor,
            search_text: self.session.search_text.clone(),
        }
    }

    pub fn handle(&mut self, input: PaginationInput) -> Vec<PaginationAction> {
        match input {
            PaginationInput::ReloadRequested => self.start_reload(),
            PaginationInput::SearchTextChanged { text } => {
                self.search_text = Some(text);
                let token = self.mint_debounce();
                self.pending_debounce = Some(token);
                vec![PaginationAction::ScheduleDebounce { token }]
            }
            PaginationInput::DebounceElapsed { token } => {
                if self.pending_debounce != Some(token) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(debounce = token.value(), "ignoring superseded debounce");
                    return Vec::new();
                }
                self.pending_debounce = None;
                self.start_reload()
            }
            PaginationInput::NextPageRequested => self.start_append(),
            PaginationInput::ItemVisible { index } => {
                let reach = index.saturating_add(self.prefetch_distance).saturating_add(1);
                if reach >= self.session.items.len() {
                    self.start_append()
                } else {
                    Vec::new()
                }
            }
            PaginationInput::PageSucceeded { token, page } => self.on_page_succeeded(token, page),
            PaginationInput::PageFailed { token, error } => self.on_page_failed(token, error),
            PaginationInput::Shutdown => self.shutdown(),
        }
    }

    fn start_reload(&mut self) -> Vec<PaginationAction> {
        let mut actions = Vec::new();

        if self.pending_debounce.take().is_some() {
            actions.push(PaginationAction::CancelDebounce);
        }

        if let Some(active) = self.session.active_request.take() {
            actions.push(PaginationAction::CancelRequest {
                token: active.token,
            });
            if active.operation == PageOperation::Append {
                actions.push(PaginationAction::Notify(PaginationEvent::LoadingChanged {
                    operation: PageOperation::Append,
                    loading: false,
                }));
            }
        }

        match self.state {
            PaginationState::Loaded | PaginationState::AppendingPage => {
                self.last_good = Some(self.session.clone());
            }
            PaginationState::Idle => self.last_good = None,
            // A restarted reload keeps the session that was good before the first one.
            PaginationState::Reloading => {}
        }

        let token = self.mint_request();
        let search_text = self.search_text.clone();
        let query = self.query_builder.build(search_text.as_deref(), 1);
        self.session = SearchSession::starting(
            query.search_text().map(str::to_string),
            ActiveRequest {
                token,
                operation: PageOperation::Reload,
            },
        );
        self.state = PaginationState::Reloading;

        actions.push(PaginationAction::Notify(PaginationEvent::Reset {
            items: Vec::new(),
        }));
        actions.push(PaginationAction::Notify(PaginationEvent::LoadingChanged {
            operation: PageOperation::Reload,
            loading: true,
        }));
        actions.push(PaginationAction::FetchPage {
            token,
            operation: PageOperation::Reload,
            query,
        });
        actions
    }

    fn start_append(&mut self) -> Vec<PaginationAction> {
        if self.state != PaginationState::Loaded || self.session.active_request.is_some() {
            return Vec::new();
        }
        let Some(cursor) = self.session.next_page_cursor else {
            return Vec::new();
        };

        let token = self.mint_request();
        let query = self
            .query_builder
            .build(self.session.search_text.as_deref(), cursor);
        self.session.active_request = Some(ActiveRequest {
            token,
            operation: PageOperation::Append,
        });
        self.state = PaginationState::AppendingPage;

        vec![
            PaginationAction::Notify(PaginationEvent::LoadingChanged {
                operation: PageOperation::Append,
                loading: true,
            }),
            PaginationAction::FetchPage {
                token,
                operation: PageOperation::Append,
                query,
            },
        ]
    }

    fn take_if_current(&mut self, token: RequestToken) -> Option<ActiveRequest> {
        match self.session.active_request {
            Some(active) if active.token == token => self.session.active_request.take(),
            _ => {
                #[cfg(feature = "tracing")]
                tracing::debug!(token = %token, "discarding stale page response");
                None
            }
        }
    }

    fn on_page_succeeded(&mut self, token: RequestToken, page: SearchPage) -> Vec<PaginationAction> {
        let Some(active) = self.take_if_current(token) else {
            return Vec::new();
        };
        self.state = PaginationState::Loaded;

        match active.operation {
            PageOperation::Reload => {
                self.last_good = None;
                self.session.replace_with(page);
                vec![
                    PaginationAction::Notify(PaginationEvent::Reset {
                        items: self.session.items.clone(),
                    }),
                    PaginationAction::Notify(PaginationEvent::LoadingChanged {
                        operation: PageOperation::Reload,
                        loading: false,
                    }),
                ]
            }
            PageOperation::Append => {
                let range = self.session.extend_with(page);
                let count = range.len();
                vec![
                    PaginationAction::Notify(PaginationEvent::Appended { range, count }),
                    PaginationAction::Notify(PaginationEvent::LoadingChanged {
                        operation: PageOperation::Append,
                        loading: false,
                    }),
                ]
            }
        }
    }

    fn on_page_failed(&mut self, token: RequestToken, error: SearchError) -> Vec<PaginationAction> {
        let Some(active) = self.take_if_current(token) else {
            return Vec::new();
        };

        let mut actions = Vec::new();
        match active.operation {
            PageOperation::Reload => match self.last_good.take() {
                Some(previous) => {
                    self.session = previous;
                    self.state = PaginationState::Loaded;
                    actions.push(PaginationAction::Notify(PaginationEvent::Reset {
                        items: self.session.items.clone(),
                    }));
                }
                None => {
                    self.state = PaginationState::Idle;
                }
            },
            // Cursor untouched so the same page can be retried.
            PageOperation::Append => self.state = PaginationState::Loaded,
        }

        // Failure is reported before loading ends.
        actions.push(PaginationAction::Notify(PaginationEvent::Failed {
            operation: active.operation,
            error,
        }));
        actions.push(PaginationAction::Notify(PaginationEvent::LoadingChanged {
            operation: active.operation,
            loading: false,
        }));
        actions
    }

    fn shutdown(&mut self) -> Vec<PaginationAction> {
        let mut actions = Vec::new();
        if self.pending_debounce.take().is_some() {
            actions.push(PaginationAction::CancelDebounce);
        }
        if let Some(active) = self.session.active_request.take() {
            actions.push(PaginationAction::CancelRequest {
                token: active.token,
            });
        }
        actions
    }

    fn mint_request(&mut self) -> RequestToken {
        self.next_request += 1;
        RequestToken(self.next_request)
    }

    fn mint_debounce(&mut self) -> DebounceToken {
        self.next_debounce += 1;
        DebounceToken(self.next_debounce)
    }
}
