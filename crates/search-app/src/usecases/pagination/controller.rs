//! Pagination controller
//!
//! Drives the [`PaginationStateMachine`] from a single actor task. UI intent,
//! debounce shots and network completions all arrive on one queue, so the
//! session is only ever mutated in one place, one input at a time.
//!
//! ```text
//! reload / set_search_text / load_next_page / item_visible
//!   ↓ (mpsc)
//! PaginationRuntime ── handle(input) ──► PaginationAction
//!   ├─ FetchPage        → spawned task → PageSucceeded / PageFailed (mpsc)
//!   ├─ ScheduleDebounce → DebounceTimer → DebounceElapsed (mpsc)
//!   ├─ Cancel*          → AbortHandle::abort
//!   └─ Notify           → EventHub<PaginationEvent>
//! ```

use std::sync::Arc;

use search_core::config::SearchConfig;
use search_core::observe::{EventHub, EventListener, Subscription};
use search_core::pagination::{
    PaginationAction, PaginationEvent, PaginationInput, PaginationStateMachine, RequestToken,
    SessionSnapshot,
};
use search_core::ports::SearchPagePort;
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use super::debounce::DebounceTimer;

/// Handle to the pagination actor.
///
/// All methods are fire-and-forget; observe results through [`subscribe`]
/// or [`watch`]. Dropping the controller cancels the active request and any
/// pending debounce.
///
/// [`subscribe`]: PaginationController::subscribe
/// [`watch`]: PaginationController::watch
pub struct PaginationController {
    inputs: mpsc::UnboundedSender<PaginationInput>,
    events: EventHub<PaginationEvent>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl PaginationController {
    /// Spawn the controller actor on the current tokio runtime.
    pub fn spawn(fetcher: Arc<dyn SearchPagePort>, config: &SearchConfig) -> Self {
        Self::with_parts(
            fetcher,
            PaginationStateMachine::from_config(config),
            DebounceTimer::new(config.debounce),
        )
    }

    pub fn with_parts(
        fetcher: Arc<dyn SearchPagePort>,
        machine: PaginationStateMachine,
        debounce: DebounceTimer,
    ) -> Self {
        let (inputs_tx, inputs_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(machine.snapshot());
        let events = EventHub::new();

        let runtime = PaginationRuntime {
            machine,
            fetcher,
            inputs_rx,
            inputs_tx: inputs_tx.clone(),
            debounce,
            in_flight: None,
            events: events.clone(),
            snapshot_tx,
        };
        tokio::spawn(runtime.run().instrument(info_span!("app.pagination")));

        Self {
            inputs: inputs_tx,
            events,
            snapshot: snapshot_rx,
        }
    }

    /// Reload immediately with the latest search text.
    pub fn reload(&self) {
        self.send(PaginationInput::ReloadRequested);
    }

    /// Record a search-text edit; the reload runs after the debounce interval.
    pub fn set_search_text(&self, text: impl Into<String>) {
        self.send(PaginationInput::SearchTextChanged { text: text.into() });
    }

    /// Near-bottom signal. A no-op while a request is in flight or when
    /// there are no more pages.
    pub fn load_next_page(&self) {
        self.send(PaginationInput::NextPageRequested);
    }

    /// Visibility signal for the item at `index`; loads the next page when
    /// the item is close enough to the end of the list.
    pub fn item_visible(&self, index: usize) {
        self.send(PaginationInput::ItemVisible { index });
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    pub fn subscribe<L>(&self, listener: &Arc<L>) -> Subscription
    where
        L: EventListener<PaginationEvent> + 'static,
    {
        self.events.subscribe(listener)
    }

    fn send(&self, input: PaginationInput) {
        if self.inputs.send(input).is_err() {
            warn!("pagination runtime is gone; input dropped");
        }
    }
}

impl Drop for PaginationController {
    fn drop(&mut self) {
        let _ = self.inputs.send(PaginationInput::Shutdown);
    }
}

struct PaginationRuntime {
    machine: PaginationStateMachine,
    fetcher: Arc<dyn SearchPagePort>,
    inputs_rx: mpsc::UnboundedReceiver<PaginationInput>,
    /// Handed to fetch tasks and the debounce timer so they can report back.
    inputs_tx: mpsc::UnboundedSender<PaginationInput>,
    debounce: DebounceTimer,
    in_flight: Option<(RequestToken, AbortHandle)>,
    events: EventHub<PaginationEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl PaginationRuntime {
    /// Run the actor loop until shutdown.
    /// 运行控制循环，直到关闭。
    async fn run(mut self) {
        while let Some(input) = self.inputs_rx.recv().await {
            let shutdown = matches!(input, PaginationInput::Shutdown);

            if let PaginationInput::PageSucceeded { token, .. }
            | PaginationInput::PageFailed { token, .. } = &input
            {
                if matches!(self.in_flight, Some((active, _)) if active == *token) {
                    self.in_flight = None;
                }
            }

            let before = self.machine.state();
            let actions = self.machine.handle(input);
            let after = self.machine.state();
            if before != after {
                debug!(from = ?before, to = ?after, "pagination state changed");
            }

            // Listeners reading the snapshot from a notification see the new state.
            self.publish_snapshot();
            for action in actions {
                self.execute(action);
            }

            if shutdown {
                info!("pagination controller shut down");
                break;
            }
        }

        self.debounce.cancel();
        if let Some((_, handle)) = self.in_flight.take() {
            handle.abort();
        }
    }

    fn execute(&mut self, action: PaginationAction) {
        match action {
            PaginationAction::ScheduleDebounce { token } => {
                let inputs = self.inputs_tx.clone();
                self.debounce.schedule(move || {
                    let _ = inputs.send(PaginationInput::DebounceElapsed { token });
                });
            }
            PaginationAction::CancelDebounce => {
                self.debounce.cancel();
            }
            PaginationAction::CancelRequest { token } => match self.in_flight.take() {
                Some((active, handle)) if active == token => {
                    handle.abort();
                    debug!(token = %token, "page request cancelled");
                }
                other => self.in_flight = other,
            },
            PaginationAction::FetchPage {
                token,
                operation,
                query,
            } => {
                let fetcher = Arc::clone(&self.fetcher);
                let inputs = self.inputs_tx.clone();
                let span = info_span!(
                    "app.pagination.fetch",
                    token = %token,
                    operation = ?operation,
                    cursor = query.page_cursor(),
                );

                let handle = tokio::spawn(
                    async move {
                        let input = match fetcher.fetch_page(&query).await {
                            Ok(page) => PaginationInput::PageSucceeded { token, page },
                            Err(error) => PaginationInput::PageFailed { token, error },
                        };
                        if inputs.send(input).is_err() {
                            debug!("controller gone; dropping page result");
                        }
                    }
                    .instrument(span),
                );

                if let Some((stale, previous)) = self.in_flight.replace((token, handle.abort_handle())) {
                    warn!(token = %stale, "replacing an uncancelled page request");
                    previous.abort();
                }
            }
            PaginationAction::Notify(event) => {
                if let PaginationEvent::Failed { operation, error } = &event {
                    warn!(operation = ?operation, error = %error, "page request failed");
                }
                self.events.emit(&event);
            }
        }
    }

    fn publish_snapshot(&self) {
        let next = self.machine.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
