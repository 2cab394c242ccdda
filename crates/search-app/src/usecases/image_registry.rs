//! Per-item image request registry
//!
//! Tracks at most one in-flight image load per [`ImageId`]. A load started
//! through [`ImageRequestRegistry::request_load`] either completes (entry
//! removed, then the callback runs) or is cancelled (entry removed, task
//! aborted, callback never runs).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use search_core::ids::ImageId;
use search_core::image::{ImageRef, LoadedImage};
use search_core::observe::{EventHub, EventListener, Subscription};
use search_core::pagination::PaginationEvent;
use search_core::ports::{ImageLoaderPort, SearchError};
use tokio::task::AbortHandle;
use tracing::{debug, info_span, warn, Instrument};

/// Per-item image load notifications.
#[derive(Debug, Clone)]
pub enum ImageLoadEvent {
    Started { id: ImageId },
    Ready { id: ImageId, image: LoadedImage },
    Failed { id: ImageId, error: SearchError },
}

struct ImageLoadEntry {
    /// Distinguishes this load from an earlier one for the same id that was
    /// cancelled but whose task has not observed the abort yet.
    generation: u64,
    handle: AbortHandle,
}

#[derive(Default)]
struct Entries {
    next_generation: u64,
    map: HashMap<ImageId, ImageLoadEntry>,
}

impl Entries {
    /// Remove the entry for `id` if it still belongs to `generation`.
    fn finish(&mut self, id: &ImageId, generation: u64) -> bool {
        match self.map.get(id) {
            Some(entry) if entry.generation == generation => {
                self.map.remove(id);
                true
            }
            _ => false,
        }
    }
}

/// Maps item ids to in-flight image loads.
///
/// Must be used from within a tokio runtime; loads run as spawned tasks.
pub struct ImageRequestRegistry {
    loader: Arc<dyn ImageLoaderPort>,
    entries: Arc<Mutex<Entries>>,
    events: EventHub<ImageLoadEvent>,
}

impl ImageRequestRegistry {
    pub fn new(loader: Arc<dyn ImageLoaderPort>) -> Self {
        Self {
            loader,
            entries: Arc::new(Mutex::new(Entries::default())),
            events: EventHub::new(),
        }
    }

    /// Start loading `image` unless a load for its id is already running.
    ///
    /// Returns `true` if a new load was started. `on_complete` runs once,
    /// after the entry has been removed, unless the load is cancelled first.
    pub fn request_load<F>(&self, image: ImageRef, on_complete: F) -> bool
    where
        F: FnOnce(&ImageId, Result<LoadedImage, SearchError>) + Send + 'static,
    {
        let mut entries = lock(&self.entries);
        if entries.map.contains_key(&image.id) {
            debug!(image_id = %image.id, "image load already in flight");
            return false;
        }

        let generation = entries.next_generation;
        entries.next_generation += 1;

        let id = image.id.clone();
        let loader = Arc::clone(&self.loader);
        let shared = Arc::clone(&self.entries);
        let events = self.events.clone();
        let span = info_span!("app.image_registry.load", image_id = %id, generation);

        // The task cannot remove its own entry before the insert below: it
        // has to take the same lock first.
        let task = tokio::spawn(
            async move {
                events.emit(&ImageLoadEvent::Started {
                    id: image.id.clone(),
                });

                let result = loader.load(&image).await;

                if !lock(&shared).finish(&image.id, generation) {
                    debug!("image load superseded; dropping result");
                    return;
                }

                match &result {
                    Ok(loaded) => events.emit(&ImageLoadEvent::Ready {
                        id: image.id.clone(),
                        image: loaded.clone(),
                    }),
                    Err(error) => {
                        warn!(error = %error, "image load failed");
                        events.emit(&ImageLoadEvent::Failed {
                            id: image.id.clone(),
                            error: error.clone(),
                        });
                    }
                }
                on_complete(&image.id, result);
            }
            .instrument(span),
        );

        entries.map.insert(
            id,
            ImageLoadEntry {
                generation,
                handle: task.abort_handle(),
            },
        );
        true
    }

    /// Cancel the load for `id`. Returns `false` when nothing was running.
    pub fn cancel_load(&self, id: &ImageId) -> bool {
        let removed = lock(&self.entries).map.remove(id);
        match removed {
            Some(entry) => {
                entry.handle.abort();
                debug!(image_id = %id, "image load cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancel every in-flight load. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<_> = lock(&self.entries).map.drain().collect();
        for (_, entry) in &drained {
            entry.handle.abort();
        }
        if !drained.is_empty() {
            debug!(count = drained.len(), "all image loads cancelled");
        }
        drained.len()
    }

    pub fn is_loading(&self, id: &ImageId) -> bool {
        lock(&self.entries).map.contains_key(id)
    }

    pub fn active_count(&self) -> usize {
        lock(&self.entries).map.len()
    }

    pub fn subscribe<L>(&self, listener: &Arc<L>) -> Subscription
    where
        L: EventListener<ImageLoadEvent> + 'static,
    {
        self.events.subscribe(listener)
    }
}

/// A reset of the result list invalidates every cell, so every load goes.
impl EventListener<PaginationEvent> for ImageRequestRegistry {
    fn on_event(&self, event: &PaginationEvent) {
        if let PaginationEvent::Reset { .. } = event {
            self.cancel_all();
        }
    }
}

impl Drop for ImageRequestRegistry {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn lock(entries: &Mutex<Entries>) -> MutexGuard<'_, Entries> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}
