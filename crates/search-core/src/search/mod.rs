//! Search domain: queries, pages and the provider envelope contract.

pub mod page;
pub mod query;
pub mod wire;

pub use page::{PageInfo, SearchPage};
pub use query::{ImageFormat, ImageSize, QueryBuilder, SearchQuery};
pub use wire::decode_search_page;
