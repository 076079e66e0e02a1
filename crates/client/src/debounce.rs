//! Cancellable quiet-period timer.
//!
//! Each [`Debouncer::schedule`] bumps a generation counter and spawns a task
//! that sleeps for the quiet interval, then runs its action only if no newer
//! schedule (or cancel) happened meanwhile. Once an action has started it runs
//! to completion.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    generation: Arc<AtomicU64>,
}

/// A scheduled action.
#[derive(Debug)]
pub struct TimerHandle {
    generation: u64,
    current: Arc<AtomicU64>,
    task: JoinHandle<bool>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Run `action` after the quiet interval unless superseded first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&self, action: F) -> TimerHandle
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.generation);
        let quiet = self.quiet;

        let task = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            if current.load(Ordering::SeqCst) != generation {
                tracing::trace!(generation, "debounced action superseded");
                return false;
            }
            action().await;
            true
        });

        TimerHandle {
            generation,
            current: Arc::clone(&self.generation),
            task,
        }
    }

    /// Invalidate every pending action.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl TimerHandle {
    /// True while nothing newer has been scheduled or cancelled.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    /// Invalidate this action if it is still the latest one. No effect once
    /// the action has started.
    pub fn cancel(&self) {
        let _ = self.current.compare_exchange(
            self.generation,
            self.generation + 1,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Wait for the timer; `true` if the action ran.
    pub async fn fired(self) -> bool {
        self.task.await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> usize) {
        let count = Arc::new(AtomicUsize::new(0));
        let read = {
            let count = Arc::clone(&count);
            move || count.load(Ordering::SeqCst)
        };
        (count, read)
    }

    fn bump(count: &Arc<AtomicUsize>) -> impl FnOnce() -> std::future::Ready<()> + Send + 'static {
        let count = Arc::clone(count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_after_quiet_interval() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let (count, runs) = counter();

        let handle = debouncer.schedule(bump(&count));
        assert!(handle.is_current());
        assert!(handle.fired().await);
        assert_eq!(runs(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_schedule_supersedes_older() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let (count, runs) = counter();

        let first = debouncer.schedule(bump(&count));
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = debouncer.schedule(bump(&count));

        assert!(!first.is_current());
        assert!(!first.fired().await);
        assert!(second.fired().await);
        assert_eq!(runs(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_pending_action() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let (count, runs) = counter();

        let handle = debouncer.schedule(bump(&count));
        handle.cancel();
        assert!(!handle.fired().await);

        let handle = debouncer.schedule(bump(&count));
        debouncer.cancel();
        assert!(!handle.fired().await);

        assert_eq!(runs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn handle_cancel_does_not_touch_newer_timer() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let (count, runs) = counter();

        let old = debouncer.schedule(bump(&count));
        let new = debouncer.schedule(bump(&count));
        old.cancel();

        assert!(new.is_current());
        assert!(new.fired().await);
        assert_eq!(runs(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_action_runs_to_completion() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let (count, runs) = counter();

        let slow = {
            let count = Arc::clone(&count);
            debouncer.schedule(move || async move {
                tokio::time::sleep(Duration::from_millis(500)).await;
                count.fetch_add(1, Ordering::SeqCst);
            })
        };

        tokio::time::sleep(Duration::from_millis(350)).await;
        debouncer.cancel();

        assert!(slow.fired().await);
        assert_eq!(runs(), 1);
    }
}
