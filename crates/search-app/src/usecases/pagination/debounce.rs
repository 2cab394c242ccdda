use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

/// Cancellable one-shot timer owned by the pagination controller.
///
/// Scheduling again replaces the pending shot. Dropping the timer cancels it.
pub struct DebounceTimer {
    delay: Duration,
    pending: Option<AbortHandle>,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `fire` once the quiet period elapses, unless rescheduled or
    /// cancelled first. Must be called inside a tokio runtime.
    pub fn schedule<F>(&mut self, fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        let deadline = Instant::now() + delay;
        let handle = tokio::spawn(async move {
            sleep_until(deadline).await;
            fire();
        });

        self.pending = Some(handle.abort_handle());
        trace!(delay_ms = delay.as_millis() as u64, "debounce scheduled");
    }

    /// Returns whether a pending shot was cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                trace!("debounce cancelled");
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    fn bump(fired: &Arc<AtomicUsize>) -> impl FnOnce() + Send + 'static {
        let fired = Arc::clone(fired);
        move || {
            fired.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DebounceTimer::new(Duration::from_millis(500));

        timer.schedule(bump(&fired));
        assert!(timer.is_pending());
        sleep(Duration::from_millis(499)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn reschedule_replaces_pending_shot() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DebounceTimer::new(Duration::from_millis(500));

        timer.schedule(bump(&fired));
        sleep(Duration::from_millis(300)).await;
        timer.schedule(bump(&fired));
        sleep(Duration::from_millis(300)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(201)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_fire_and_is_idempotent() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DebounceTimer::new(Duration::from_millis(500));

        timer.schedule(bump(&fired));
        assert!(timer.cancel());
        assert!(!timer.cancel());
        sleep(Duration::from_secs(1)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
