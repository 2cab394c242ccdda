//! Pagination domain: session state and the pure state machine that decides
//! which requests to issue and which notifications to send.
//!
//! ```text
//! UI intent (reload / text change / near bottom)
//!   ↓
//! PaginationStateMachine::handle (pure transition)
//!   ↓
//! PaginationAction (executed by the controller in search-app)
//!   ↓
//! network fetch / debounce timer / UI notification
//! ```

pub mod session;
pub mod state_machine;

pub use session::{ActiveRequest, SearchSession, SessionSnapshot};
pub use state_machine::{
    DebounceToken, PaginationAction, PaginationEvent, PaginationInput, PaginationState,
    PaginationStateMachine, PageOperation, RequestToken,
};
