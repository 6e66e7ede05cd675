//! Hand-off of button activations from the interrupt thread to the
//! coordinator.

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use tokio::sync::Notify;
use tracing::trace;

/// Single-slot mailbox for pending activations.
///
/// Not a queue: an activation posted while another is still pending is
/// coalesced into it, the same as one physical press.
#[derive(Debug, Default)]
pub struct ActivationMailbox {
    pending: AtomicBool,
    wake: Notify,
}

impl ActivationMailbox {
    /// Create an empty mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an activation as pending. Safe to call from any thread.
    pub fn post(&self) {
        if self.pending.swap(true, Ordering::AcqRel) {
            trace!("Activation coalesced with pending one");
            return;
        }
        self.wake.notify_one();
    }

    /// Clear the pending flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Wait until an activation may be pending.
    ///
    /// Can wake spuriously; always confirm with [`take`](Self::take).
    pub async fn wait(&self) {
        self.wake.notified().await;
    }
}

/// Suppresses edges that follow an accepted edge too closely.
///
/// Timestamps are monotonic offsets, as reported by the GPIO interrupt.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last_accepted: Option<Duration>,
}

impl Debouncer {
    /// Create a debouncer with the given window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: None,
        }
    }

    /// Returns `true` if the edge at `at` is a new activation.
    pub fn accept(&mut self, at: Duration) -> bool {
        match self.last_accepted {
            Some(last) if at.saturating_sub(last) < self.window => false,
            _ => {
                self.last_accepted = Some(at);
                true
            }
        }
    }
}
