//! Port interfaces for the application layer
//!
//! Ports define the contract between the use cases in `search-app` and the
//! adapters in `search-infra`. The core never depends on a concrete
//! transport or decoder.

pub mod errors;
mod image_decoder;
mod image_loader;
mod search_page;
mod transport;

pub use errors::{SearchError, TransportError};
pub use image_decoder::ImageDecoderPort;
pub use image_loader::ImageLoaderPort;
pub use search_page::SearchPagePort;
pub use transport::{HttpMethod, HttpRequest, TransportPort};
