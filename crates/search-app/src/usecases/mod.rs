//! Business logic use cases
//!
//! ```text
//! UI intent ──► PaginationController ──► SearchClient ──► TransportPort
//!                     │ (PaginationEvent)
//!                     ▼
//!                UI collaborator ◄── ImageRequestRegistry ──► ImageLoader ──► TransportPort
//!                                      (ImageLoadEvent)                  └──► ImageDecoderPort
//! ```

pub mod image_loader;
pub mod image_registry;
pub mod pagination;
pub mod search_client;

pub use image_loader::ImageLoader;
pub use image_registry::{ImageLoadEvent, ImageRequestRegistry};
pub use pagination::{DebounceTimer, PaginationController};
pub use search_client::SearchClient;
