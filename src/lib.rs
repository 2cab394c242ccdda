//! imagesearch: paginated image search browsing core with a terminal front end.
//!
//! The library half exposes the bootstrap (config, tracing, wiring) and the
//! terminal view so integration tests can drive the same code as the binary.

pub mod bootstrap;
pub mod cli;
