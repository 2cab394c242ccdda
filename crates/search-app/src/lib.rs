//! imagesearch Application Orchestration Layer
//!
//! This crate contains the use cases that sit between the UI collaborator
//! and the ports defined in `search-core`.

pub mod usecases;

pub use usecases::{
    ImageLoadEvent, ImageLoader, ImageRequestRegistry, PaginationController, SearchClient,
};
