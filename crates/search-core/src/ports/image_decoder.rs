use crate::image::LoadedImage;

use super::errors::SearchError;

/// Turns raw image bytes into a displayable image.
///
/// Synchronous and pure. Invalid bytes yield [`SearchError::Decode`].
pub trait ImageDecoderPort: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<LoadedImage, SearchError>;
}
