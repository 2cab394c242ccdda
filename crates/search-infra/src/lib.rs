//! imagesearch infrastructure layer
//!
//! Concrete adapters for the ports declared in `search-core`:
//! - [`network::ReqwestTransport`] implements `TransportPort` over reqwest.
//! - [`decode::ImageCrateDecoder`] implements `ImageDecoderPort` with the `image` crate.

pub mod decode;
pub mod network;

pub use decode::ImageCrateDecoder;
pub use network::ReqwestTransport;
