use tokio::time::Instant;
use uuid::Uuid;

/// Authoritative recorder state, owned by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Not currently recording.
    Idle,
    /// Currently recording audio.
    Recording {
        /// When recording started.
        started_at: Instant,
        /// Unique session ID for log correlation.
        session_id: Uuid,
    },
}

impl RecorderState {
    /// Whether a session is open.
    pub fn is_recording(&self) -> bool {
        matches!(self, RecorderState::Recording { .. })
    }
}
