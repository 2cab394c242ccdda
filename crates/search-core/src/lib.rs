//! # search-core
//!
//! Core domain models and business logic for imagesearch.
//!
//! This crate contains pure business logic without any infrastructure dependencies:
//! query normalization, the provider envelope contract, the pagination state
//! machine and the ports implemented by `search-app` and `search-infra`.

// Public module exports
pub mod config;
pub mod ids;
pub mod image;
pub mod observe;
pub mod pagination;
pub mod ports;
pub mod search;

// Re-export commonly used types at the crate root
pub use config::SearchConfig;
pub use ids::ImageId;
pub use image::{ImageRef, LoadedImage};
pub use observe::{EventHub, EventListener, Subscription};
pub use pagination::{PaginationEvent, PaginationState, PageOperation, RequestToken, SessionSnapshot};
pub use ports::errors::SearchError;
pub use search::{PageInfo, QueryBuilder, SearchPage, SearchQuery};
