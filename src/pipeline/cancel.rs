//! One-shot broadcast cancellation.
//!
//! The signal is a crossbeam channel on which nothing is ever sent. Raising
//! it drops the only sender, which disconnects the channel: from then on
//! every `recv` on every clone of the receiver completes immediately. That
//! makes the listener usable as an arm of `select!` at each stage's
//! suspension point, alongside the data channels.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Trigger {
    sender: Mutex<Option<Sender<()>>>,
    raised: AtomicBool,
}

/// Shared cancellation handle. Clones observe the same signal.
#[derive(Clone)]
pub struct CancellationSignal {
    trigger: Arc<Trigger>,
    listener: Receiver<()>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        let (sender, listener) = bounded(0);
        Self {
            trigger: Arc::new(Trigger {
                sender: Mutex::new(Some(sender)),
                raised: AtomicBool::new(false),
            }),
            listener,
        }
    }

    /// Raise the signal. Returns `true` only for the call that raised it.
    pub fn raise(&self) -> bool {
        let sender = self
            .trigger
            .sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        match sender {
            Some(sender) => {
                // Flag first so that anyone woken by the disconnect sees it set.
                self.trigger.raised.store(true, Ordering::SeqCst);
                drop(sender);
                tracing::debug!("Cancellation raised");
                true
            }
            None => false,
        }
    }

    pub fn is_raised(&self) -> bool {
        self.trigger.raised.load(Ordering::SeqCst)
    }

    /// Receiver that becomes ready (disconnected) once the signal is raised.
    pub fn listener(&self) -> &Receiver<()> {
        &self.listener
    }

    /// Pass `result` through, raising the signal first if it is an error.
    pub fn raise_on_err<T, E>(&self, result: Result<T, E>) -> Result<T, E> {
        if result.is_err() {
            self.raise();
        }
        result
    }

    /// Block until the signal is raised.
    pub fn wait(&self) {
        let _ = self.listener.recv();
    }

    /// Block until the signal is raised or `timeout` elapses.
    /// Returns whether the signal was raised.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.listener.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) | Ok(()) => true,
        }
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationSignal")
            .field("raised", &self.is_raised())
            .finish()
    }
}
