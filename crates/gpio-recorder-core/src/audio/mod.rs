pub(crate) mod capture;
mod format;
pub(crate) mod gate;
mod session;

pub use {
    capture::{AudioCapturer, CaptureChannel},
    format::CaptureFormat,
    gate::{Delivery, DeliveryGate, FaultHandler, QUEUE_DEPTH},
    session::{ArtifactSink, SessionSummary, SessionWriter},
};
