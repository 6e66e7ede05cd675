use crate::{AudioError, CoreResult, SessionWriter};

use std::{
    panic::Location,
    sync::{Arc, Mutex, MutexGuard},
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Sender, TrySendError, bounded};
use error_location::ErrorLocation;
use tracing::{debug, error, trace, warn};

/// Buffers that may wait for the session writer before new ones are dropped.
pub const QUEUE_DEPTH: usize = 64;

/// Callback invoked from the session writer thread when an append fails.
pub type FaultHandler = Arc<dyn Fn(AudioError) + Send + Sync>;

/// What happened to one delivered buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued for the bound session's writer.
    Queued,
    /// No session bound; buffer dropped.
    Discarded,
    /// The writer is a full queue behind; buffer dropped.
    Overrun,
    /// The bound session already failed and reported its fault; buffer
    /// dropped.
    Failed,
}

/// A bound session and the thread appending to it.
struct Binding {
    session: Arc<SessionWriter>,
    tx: Sender<Vec<i16>>,
    writer: JoinHandle<()>,
}

impl Binding {
    #[track_caller]
    fn spawn(session: Arc<SessionWriter>, on_fault: FaultHandler) -> CoreResult<Self> {
        let location = Location::caller();
        let (tx, rx) = bounded::<Vec<i16>>(QUEUE_DEPTH);
        let writer_session = Arc::clone(&session);

        let writer = thread::Builder::new()
            .name("session-writer".to_string())
            .spawn(move || {
                for samples in rx.iter() {
                    if let Err(e) = writer_session.append(&samples) {
                        error!(error = %e, "Failed to append captured buffer");
                        // Dropping the receiver makes later deliveries fail fast.
                        on_fault(e);
                        return;
                    }
                }
                debug!(path = ?writer_session.path(), "Session writer drained");
            })
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to spawn session writer: {}", e),
                location: ErrorLocation::from(location),
            })?;

        Ok(Self {
            session,
            tx,
            writer,
        })
    }

    /// Close the queue and wait until every queued buffer has been appended.
    fn finish(self) -> Arc<SessionWriter> {
        drop(self.tx);
        if self.writer.join().is_err() {
            error!(path = ?self.session.path(), "Session writer thread panicked");
        }
        self.session
    }
}

/// Slot through which the audio callback reaches the current session.
///
/// The audio callback only copies each buffer into a bounded queue; a
/// dedicated thread per binding appends to the [`SessionWriter`], so file
/// I/O never runs on the audio thread. [`unbind`](Self::unbind) empties the
/// slot under the same lock [`deliver`](Self::deliver) holds, then waits for
/// the writer thread to drain and exit: once it returns, nothing more reaches
/// the unbound session.
pub struct DeliveryGate {
    slot: Mutex<Option<Binding>>,
    on_fault: FaultHandler,
}

impl DeliveryGate {
    /// Create an unbound gate reporting write failures to `on_fault`.
    pub fn new(on_fault: FaultHandler) -> Self {
        Self {
            slot: Mutex::new(None),
            on_fault,
        }
    }

    /// Route future deliveries to `session`, replacing any previous binding.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::DeviceError`] if the writer thread cannot be
    /// spawned. The gate is left unchanged in that case.
    #[track_caller]
    pub fn bind(&self, session: Arc<SessionWriter>) -> CoreResult<()> {
        trace!(path = ?session.path(), "Delivery gate bound");
        let binding = Binding::spawn(session, Arc::clone(&self.on_fault))?;

        let previous = self.lock_slot().replace(binding);
        if let Some(previous) = previous {
            let session = previous.finish();
            debug!(path = ?session.path(), "Replaced previous binding");
        }

        Ok(())
    }

    /// Stop routing deliveries and wait for queued buffers to be written.
    pub fn unbind(&self) -> Option<Arc<SessionWriter>> {
        let previous = self.lock_slot().take();
        let session = previous.map(Binding::finish);
        trace!(was_bound = session.is_some(), "Delivery gate unbound");
        session
    }

    /// Whether a session is currently bound.
    pub fn is_bound(&self) -> bool {
        self.lock_slot().is_some()
    }

    /// Buffers waiting for the bound session's writer.
    pub fn queued(&self) -> usize {
        self.lock_slot().as_ref().map_or(0, |binding| binding.tx.len())
    }

    /// Queue one buffer for the bound session, if any. Never blocks on I/O.
    pub fn deliver(&self, samples: &[i16]) -> Delivery {
        let slot = self.lock_slot();

        let Some(binding) = slot.as_ref() else {
            return Delivery::Discarded;
        };

        match binding.tx.try_send(samples.to_vec()) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Full(_)) => {
                warn!(queue_depth = QUEUE_DEPTH, "Session writer behind, buffer dropped");
                Delivery::Overrun
            }
            Err(TrySendError::Disconnected(_)) => Delivery::Failed,
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<Binding>> {
        // A poisoned slot still holds a valid Option; keep going.
        self.slot.lock().unwrap_or_else(|e| {
            error!("Delivery gate lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}
