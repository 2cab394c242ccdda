//! Pagination use case: the controller actor plus its debounce timer.

mod controller;
mod debounce;

pub use controller::PaginationController;
pub use debounce::DebounceTimer;
