use image::imageops::FilterType;
use image::GenericImageView;
use search_core::config::SearchConfig;
use search_core::image::LoadedImage;
use search_core::ports::{ImageDecoderPort, SearchError};

/// Decodes PNG, JPEG, WebP and GIF bytes into RGBA8.
///
/// With a `max_edge`, larger images are downscaled so their longest edge
/// fits, preserving the aspect ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder {
    max_edge: Option<u32>,
}

impl ImageCrateDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_edge(max_edge: u32) -> Self {
        Self {
            max_edge: Some(max_edge.max(1)),
        }
    }

    /// Downscale to `thumbnail_max_edge` when the config sets one.
    pub fn from_config(config: &SearchConfig) -> Self {
        config
            .thumbnail_max_edge
            .map(Self::with_max_edge)
            .unwrap_or_default()
    }
}

impl ImageDecoderPort for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<LoadedImage, SearchError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| SearchError::Decode(format!("decode image bytes: {e}")))?;

        let (width, height) = decoded.dimensions();
        let rgba = match self.max_edge {
            Some(max_edge) => {
                let (target_width, target_height) = fit_within(width, height, max_edge);
                if (target_width, target_height) == (width, height) {
                    decoded.to_rgba8()
                } else {
                    image::imageops::resize(&decoded, target_width, target_height, FilterType::Triangle)
                }
            }
            None => decoded.to_rgba8(),
        };

        let (width, height) = rgba.dimensions();
        Ok(LoadedImage::new(width, height, rgba.into_raw()))
    }
}

fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width <= max_edge && height <= max_edge {
        return (width, height);
    }

    if width >= height {
        let scaled = ((height as f64) * (max_edge as f64) / (width as f64)).round() as u32;
        (max_edge, scaled.max(1))
    } else {
        let scaled = ((width as f64) * (max_edge as f64) / (height as f64)).round() as u32;
        (scaled.max(1), max_edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_pixel(width, height, Rgba([10u8, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        buffer.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decodes_png_to_rgba() {
        let loaded = ImageCrateDecoder::new().decode(&png(2, 3)).unwrap();
        assert_eq!((loaded.width, loaded.height), (2, 3));
        assert_eq!(loaded.rgba.len(), 2 * 3 * 4);
        assert_eq!(&loaded.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_garbage_bytes_are_decode_error() {
        let err = ImageCrateDecoder::new().decode(b"not an image").unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
    }

    #[test]
    fn test_max_edge_downscales_keeping_aspect() {
        let loaded = ImageCrateDecoder::with_max_edge(32).decode(&png(128, 64)).unwrap();
        assert_eq!((loaded.width, loaded.height), (32, 16));
    }

    #[test]
    fn test_max_edge_leaves_small_images_alone() {
        let loaded = ImageCrateDecoder::with_max_edge(32).decode(&png(8, 8)).unwrap();
        assert_eq!((loaded.width, loaded.height), (8, 8));
    }

    #[test]
    fn test_from_config_applies_thumbnail_max_edge() {
        let mut config = SearchConfig::default();
        let loaded = ImageCrateDecoder::from_config(&config).decode(&png(64, 32)).unwrap();
        assert_eq!((loaded.width, loaded.height), (64, 32));

        config.thumbnail_max_edge = Some(16);
        let loaded = ImageCrateDecoder::from_config(&config).decode(&png(64, 32)).unwrap();
        assert_eq!((loaded.width, loaded.height), (16, 8));
    }

    #[test]
    fn test_fit_within_tall_image() {
        assert_eq!(fit_within(100, 400, 100), (25, 100));
        assert_eq!(fit_within(1, 1000, 10), (1, 10));
    }
}
