//! Dependency wiring
//!
//! Builds the infra adapters, hands them to the use cases as port trait
//! objects and links the image registry to the pagination events.
//! Must run inside a tokio runtime: the controller spawns its actor here.

use std::sync::Arc;

use anyhow::Context;
use search_app::usecases::{ImageLoader, ImageRequestRegistry, PaginationController, SearchClient};
use search_core::config::SearchConfig;
use search_core::observe::Subscription;
use search_core::ports::{ImageDecoderPort, TransportPort};
use search_infra::{ImageCrateDecoder, ReqwestTransport};
use tracing::{info, warn};

/// Everything the front end talks to.
pub struct SearchServices {
    pub controller: PaginationController,
    pub registry: Arc<ImageRequestRegistry>,
    /// Keeps the registry subscribed to list resets.
    _registry_link: Subscription,
}

/// Wire the production adapters.
pub fn wire_services(config: &SearchConfig) -> anyhow::Result<SearchServices> {
    let transport =
        ReqwestTransport::from_config(config).context("Failed to create HTTP transport")?;
    Ok(wire_with(
        config,
        Arc::new(transport),
        Arc::new(ImageCrateDecoder::from_config(config)),
    ))
}

/// Wire the use cases over caller-provided ports.
pub fn wire_with(
    config: &SearchConfig,
    transport: Arc<dyn TransportPort>,
    decoder: Arc<dyn ImageDecoderPort>,
) -> SearchServices {
    if config.provider.api_key.is_empty() || config.provider.engine_id.is_empty() {
        warn!("provider api_key or engine_id is empty; requests will likely be rejected");
    }

    let client = Arc::new(SearchClient::new(
        Arc::clone(&transport),
        config.provider.clone(),
    ));
    let loader = Arc::new(ImageLoader::new(transport, decoder));
    let registry = Arc::new(ImageRequestRegistry::new(loader));
    let controller = PaginationController::spawn(client, config);
    let registry_link = controller.subscribe(&registry);

    info!(
        endpoint = %config.provider.endpoint,
        page_size = config.page_size,
        debounce_ms = config.debounce.as_millis() as u64,
        "search services wired"
    );

    SearchServices {
        controller,
        registry,
        _registry_link: registry_link,
    }
}
