use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

/// Audio capture and session errors with source location tracking.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The output artifact could not be created.
    #[error("Failed to create artifact {path:?}: {source} {location}")]
    ArtifactCreateFailed {
        /// Path of the artifact that could not be created.
        path: PathBuf,
        /// Underlying error from hound or the filesystem.
        #[source]
        source: hound::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing samples or finalizing the header failed.
    #[error("Failed to write artifact {path:?}: {source} {location}")]
    WriteFailed {
        /// Path of the artifact being written.
        path: PathBuf,
        /// Underlying error from hound or the filesystem.
        #[source]
        source: hound::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Samples were appended to a session that was already closed.
    #[error("Session already closed: {path:?} {location}")]
    SessionClosed {
        /// Path of the closed artifact.
        path: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`AudioError`].
pub type Result<T> = std::result::Result<T, AudioError>;
