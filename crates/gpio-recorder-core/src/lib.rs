//! gpio-recorder Core Library
//!
//! Hardware-independent audio path for the push-to-toggle recorder: a fixed
//! capture format, a CPAL input channel that can be started and stopped
//! without reopening the device, and a WAV session writer built on hound.
//!
//! # Example
//!
//! ```no_run
//! use gpio_recorder_core::{
//!     AudioCapturer, CaptureChannel, CaptureFormat, CoreResult, FaultHandler, SessionWriter,
//! };
//!
//! use std::{sync::Arc, thread::sleep, time::Duration};
//!
//! fn main() -> CoreResult<()> {
//!     let format = CaptureFormat::default();
//!     let on_fault: FaultHandler = Arc::new(|e| eprintln!("capture fault: {e}"));
//!     let mut capturer = AudioCapturer::new(format, None, on_fault)?;
//!
//!     let session = Arc::new(SessionWriter::create("take.wav", format)?);
//!     capturer.start(Arc::clone(&session))?;
//!     sleep(Duration::from_secs(3));
//!     capturer.stop();
//!
//!     if let Some(summary) = session.close()? {
//!         println!("Wrote {} frames to {:?}", summary.frames_written, summary.path);
//!     }
//!     Ok(())
//! }
//! ```

mod audio;
mod error;

pub use {
    audio::{
        ArtifactSink, AudioCapturer, CaptureChannel, CaptureFormat, Delivery, DeliveryGate,
        FaultHandler, QUEUE_DEPTH, SessionSummary, SessionWriter,
    },
    error::AudioError,
    error::Result as CoreResult,
};
