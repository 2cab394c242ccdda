use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Identifier of a single search result image.
///
/// The provider has no stable per-item id, so one is minted when a page is
/// decoded. It stays stable for the whole session, which lets the image
/// registry key in-flight downloads on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(String);

impl_id!(ImageId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        let a = ImageId::new();
        let b = ImageId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_image_id_from_str() {
        let id: ImageId = "img-1".into();
        assert_eq!(id.as_str(), "img-1");
        assert_eq!(id.to_string(), "img-1");
    }
}
