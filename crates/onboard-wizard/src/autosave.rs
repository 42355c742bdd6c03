//! Debounced save trigger
//!
//! Coalesces a burst of edit notifications into a single save:
//! - [`DebouncedSave::bump`] (re)starts the idle countdown
//! - When the countdown expires the save callback runs once
//! - [`DebouncedSave::flush_now`] saves immediately on the calling thread
//!
//! The countdown runs on the tokio timer. Callback invocations are serialized,
//! and a failing or panicking callback is logged and reported through
//! [`SaveStatus`] without disabling the trigger.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Idle interval used when none (or zero) is configured
pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_millis(750);

/// Observable state of the trigger, for "Saving..." / "Saved" indicators
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    /// Nothing pending
    #[default]
    Idle,
    /// A countdown is running
    Pending,
    /// The last save succeeded at this time
    Saved(DateTime<Utc>),
    /// The last save failed with this message
    Failed(String),
}

type SaveFn = Box<dyn FnMut() -> Result<(), String> + Send>;

#[derive(Debug, Default)]
struct TimerState {
    deadline: Option<Instant>,
    disposed: bool,
}

struct Shared {
    idle: Duration,
    state: Mutex<TimerState>,
    wake: Notify,
    save: Mutex<SaveFn>,
    status: watch::Sender<SaveStatus>,
}

impl Shared {
    fn invoke(&self) {
        let mut save = self.save.lock();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| save()))
            .unwrap_or_else(|payload| Err(panic_message(payload.as_ref())));
        match outcome {
            Ok(()) => {
                self.status.send_replace(SaveStatus::Saved(Utc::now()));
            }
            Err(message) => {
                tracing::warn!(error = %message, "auto-save failed");
                self.status.send_replace(SaveStatus::Failed(message));
            }
        }
    }

    async fn run(self: Arc<Self>) {
        loop {
            let deadline = {
                let state = self.state.lock();
                if state.disposed {
                    return;
                }
                state.deadline
            };

            let Some(at) = deadline else {
                self.wake.notified().await;
                continue;
            };

            tokio::select! {
                () = self.wake.notified() => {}
                () = tokio::time::sleep_until(at) => {
                    let due = {
                        let mut state = self.state.lock();
                        if state.disposed {
                            return;
                        }
                        if state.deadline == Some(at) {
                            state.deadline = None;
                            true
                        } else {
                            false
                        }
                    };
                    if due {
                        self.invoke();
                    }
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("save panicked: {detail}")
}

/// Cancellable, coalescing save timer
pub struct DebouncedSave {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for DebouncedSave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedSave")
            .field("idle", &self.shared.idle)
            .field("pending", &self.is_pending())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl DebouncedSave {
    /// Create a trigger that runs `save` after `idle` of quiet
    ///
    /// A zero `idle` falls back to [`DEFAULT_IDLE_INTERVAL`].
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime, like [`tokio::spawn`].
    pub fn new<F, E>(idle: Duration, mut save: F) -> Self
    where
        F: FnMut() -> Result<(), E> + Send + 'static,
        E: Display,
    {
        let idle = if idle.is_zero() {
            DEFAULT_IDLE_INTERVAL
        } else {
            idle
        };
        let (status, _) = watch::channel(SaveStatus::Idle);
        let shared = Arc::new(Shared {
            idle,
            state: Mutex::new(TimerState::default()),
            wake: Notify::new(),
            save: Mutex::new(Box::new(move || save().map_err(|e| e.to_string()))),
            status,
        });
        let worker = tokio::spawn(Arc::clone(&shared).run());
        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Effective idle interval
    #[inline]
    #[must_use]
    pub fn idle(&self) -> Duration {
        self.shared.idle
    }

    /// Restart the countdown; only the last bump before expiry counts
    pub fn bump(&self) {
        {
            let mut state = self.shared.state.lock();
            if state.disposed {
                return;
            }
            state.deadline = Some(Instant::now() + self.shared.idle);
        }
        self.shared.status.send_replace(SaveStatus::Pending);
        self.shared.wake.notify_one();
    }

    /// Cancel any countdown and save now, on the calling thread
    pub fn flush_now(&self) {
        {
            let mut state = self.shared.state.lock();
            if state.disposed {
                return;
            }
            state.deadline = None;
        }
        self.shared.wake.notify_one();
        self.shared.invoke();
    }

    /// Cancel any countdown without saving
    pub fn cancel(&self) {
        let was_pending = {
            let mut state = self.shared.state.lock();
            if state.disposed {
                return;
            }
            state.deadline.take().is_some()
        };
        if was_pending {
            self.shared.status.send_replace(SaveStatus::Idle);
            self.shared.wake.notify_one();
        }
    }

    /// True while a countdown is running
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.shared.state.lock().deadline.is_some()
    }

    /// True after [`DebouncedSave::shutdown`]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.shared.state.lock().disposed
    }

    /// Publish a save that happened outside the trigger
    pub(crate) fn mark_saved(&self) {
        if !self.is_disposed() {
            self.shared.status.send_replace(SaveStatus::Saved(Utc::now()));
        }
    }

    /// Watch the save status
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.shared.status.subscribe()
    }

    /// Stop the timer; a pending countdown is dropped, not run
    ///
    /// Idempotent. Afterwards every operation is a no-op.
    pub fn shutdown(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.disposed = true;
            state.deadline = None;
        }
        self.shared.wake.notify_one();
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

impl Drop for DebouncedSave {
    fn drop(&mut self) {
        self.shutdown();
    }
}
