use crate::Budget;

use gpio_recorder_core::AudioError;

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the gpio-recorder binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// GPIO or audio device setup failed.
    #[error("Hardware initialization failed: {reason} {location}")]
    HardwareInit {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// The output artifact for a new session could not be created.
    #[error("Failed to create recording artifact: {source} {location}")]
    ArtifactCreate {
        /// The underlying audio error.
        #[source]
        source: AudioError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Storage failed while a session was being written or finalized.
    #[error("Recording write failed: {source} {location}")]
    SessionWrite {
        /// The underlying audio error.
        #[source]
        source: AudioError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// The timeout expired while recording.
    #[error("Timer expired while recording ({budget:?} budget) {location}")]
    TimerViolation {
        /// Budget the timer had been armed with.
        budget: Budget,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Audio subsystem error from gpio-recorder-core.
    #[error("Audio error: {source} {location}")]
    Audio {
        /// The underlying audio error.
        #[source]
        source: AudioError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

impl AppError {
    /// Whether the coordinator may keep running after this error.
    ///
    /// Only a failed artifact creation is recoverable: the transition is
    /// aborted before any state changes.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::ArtifactCreate { .. })
    }
}

// Manual From<AudioError> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<AudioError> for AppError {
    #[track_caller]
    fn from(source: AudioError) -> Self {
        AppError::Audio {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<rppal::gpio::Error> for AppError {
    #[track_caller]
    fn from(source: rppal::gpio::Error) -> Self {
        AppError::HardwareInit {
            reason: format!("GPIO: {}", source),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
