use std::sync::Arc;

use async_trait::async_trait;
use search_core::image::{ImageRef, LoadedImage};
use search_core::ports::{HttpRequest, ImageDecoderPort, ImageLoaderPort, SearchError, TransportPort};
use tracing::{debug, info_span, Instrument};

/// Fetches the bytes behind an [`ImageRef`] and decodes them.
///
/// Cancel by aborting the task that awaits [`ImageLoaderPort::load`];
/// nothing is reported in that case.
pub struct ImageLoader {
    transport: Arc<dyn TransportPort>,
    decoder: Arc<dyn ImageDecoderPort>,
}

impl ImageLoader {
    pub fn new(transport: Arc<dyn TransportPort>, decoder: Arc<dyn ImageDecoderPort>) -> Self {
        Self { transport, decoder }
    }
}

#[async_trait]
impl ImageLoaderPort for ImageLoader {
    async fn load(&self, image: &ImageRef) -> Result<LoadedImage, SearchError> {
        let span = info_span!("app.image_loader.load", image_id = %image.id);

        async {
            let bytes = self
                .transport
                .perform(HttpRequest::get(image.source_url.as_str()))
                .await?;

            // Decoding is CPU-bound; keep it off the async workers.
            let decoder = Arc::clone(&self.decoder);
            let decoded = tokio::task::spawn_blocking(move || decoder.decode(&bytes))
                .await
                .map_err(|err| SearchError::Decode(format!("decoder task failed: {err}")))??;

            debug!(width = decoded.width, height = decoded.height, "image decoded");
            Ok::<_, SearchError>(decoded)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use mockall::mock;
    use search_core::ports::TransportError;
    use url::Url;

    mock! {
        pub Transport {}

        #[async_trait]
        impl TransportPort for Transport {
            async fn perform(&self, request: HttpRequest) -> Result<Bytes, TransportError>;
        }
    }

    mock! {
        pub Decoder {}

        impl ImageDecoderPort for Decoder {
            fn decode(&self, bytes: &[u8]) -> Result<LoadedImage, SearchError>;
        }
    }

    fn image_ref() -> ImageRef {
        ImageRef::new(Url::parse("https://thumb.example.com/cat.png").unwrap())
    }

    #[tokio::test]
    async fn test_load_fetches_source_url_and_decodes() {
        let mut transport = MockTransport::new();
        transport
            .expect_perform()
            .withf(|request| request.url == "https://thumb.example.com/cat.png" && request.params.is_empty())
            .times(1)
            .returning(|_| Ok(Bytes::from_static(b"png-bytes")));

        let mut decoder = MockDecoder::new();
        decoder
            .expect_decode()
            .withf(|bytes| bytes == b"png-bytes")
            .times(1)
            .returning(|_| Ok(LoadedImage::new(2, 1, vec![0u8; 8])));

        let loader = ImageLoader::new(Arc::new(transport), Arc::new(decoder));
        let image = loader.load(&image_ref()).await.unwrap();
        assert_eq!((image.width, image.height), (2, 1));
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_perform()
            .returning(|_| Err(TransportError::Status(404)));
        let mut decoder = MockDecoder::new();
        decoder.expect_decode().never();

        let loader = ImageLoader::new(Arc::new(transport), Arc::new(decoder));
        let err = loader.load(&image_ref()).await.unwrap_err();
        assert!(matches!(err, SearchError::Network(_)));
    }

    #[tokio::test]
    async fn test_invalid_bytes_is_decode_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_perform()
            .returning(|_| Ok(Bytes::from_static(b"not an image")));
        let mut decoder = MockDecoder::new();
        decoder
            .expect_decode()
            .returning(|_| Err(SearchError::Decode("unknown format".into())));

        let loader = ImageLoader::new(Arc::new(transport), Arc::new(decoder));
        let err = loader.load(&image_ref()).await.unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
    }
}
