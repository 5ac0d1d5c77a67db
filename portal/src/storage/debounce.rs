//! Debounced persistence.
//!
//! A [`Debouncer`] coalesces a burst of save requests into one write: every
//! [`schedule`](Debouncer::schedule) replaces the pending snapshot and
//! re-arms the timer, and the action runs once, with the newest snapshot,
//! after the delay passes with no further calls.
//!
//! Dropping the debouncer cancels the timer and discards the pending
//! snapshot. Call [`flush`](Debouncer::flush) first if the write must land.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Default quiet period before a scheduled write runs.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

type Action<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Snapshot waiting to be written, tagged with the `schedule` call that
/// produced it.
type Pending<T> = Arc<Mutex<Option<(u64, T)>>>;

/// Delays an action until calls stop arriving for `delay`.
///
/// Writes never overlap: a timer that is already running its action holds
/// the write lock, so a later [`flush`](Debouncer::flush) waits for it and
/// the newest snapshot always lands last.
///
/// Must be used from within a tokio runtime.
pub struct Debouncer<T: Send + 'static> {
    delay: Duration,
    action: Action<T>,
    pending: Pending<T>,
    write_lock: Arc<Mutex<()>>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Creates a debouncer that runs `action` after `delay` of quiet.
    pub fn new(delay: Duration, action: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            action: Arc::new(action),
            pending: Arc::new(Mutex::new(None)),
            write_lock: Arc::new(Mutex::new(())),
            generation: 0,
            timer: None,
        }
    }

    /// The configured quiet period.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces the pending snapshot with `value` and re-arms the timer.
    pub fn schedule(&mut self, value: T) {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        *self.pending.lock() = Some((generation, value));
        self.abort_timer();

        let pending = Arc::clone(&self.pending);
        let write_lock = Arc::clone(&self.write_lock);
        let action = Arc::clone(&self.action);
        let delay = self.delay;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _writing = write_lock.lock();
            // A newer schedule owns the snapshot; its own timer writes it.
            if let Some(value) = take_if_current(&pending, generation) {
                action(value);
            }
        }));
    }

    /// Runs the pending snapshot now. Returns whether anything was written.
    ///
    /// Blocks until a write already in progress has finished.
    pub fn flush(&mut self) -> bool {
        self.abort_timer();
        let _writing = self.write_lock.lock();
        let Some((_, value)) = self.pending.lock().take() else {
            return false;
        };
        (self.action)(value);
        true
    }

    /// Cancels the timer and returns the discarded snapshot, if any.
    pub fn cancel(&mut self) -> Option<T> {
        self.abort_timer();
        self.pending.lock().take().map(|(_, value)| value)
    }

    /// Whether a snapshot is waiting to be written.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if self.cancel().is_some() {
            tracing::debug!("pending write discarded on teardown");
        }
    }
}

/// Takes the pending snapshot only if it still belongs to `generation`.
fn take_if_current<T>(pending: &Mutex<Option<(u64, T)>>, generation: u64) -> Option<T> {
    let mut slot = pending.lock();
    match slot.take() {
        Some((g, value)) if g == generation => Some(value),
        other => {
            *slot = other;
            None
        }
    }
}
