use crate::image::{ImageRef, LoadedImage};

use super::errors::SearchError;

/// Loads and decodes the image behind an [`ImageRef`].
///
/// Cancellation is dropping (or aborting) the future; it is never reported
/// as an error.
#[async_trait::async_trait]
pub trait ImageLoaderPort: Send + Sync {
    async fn load(&self, image: &ImageRef) -> Result<LoadedImage, SearchError>;
}
