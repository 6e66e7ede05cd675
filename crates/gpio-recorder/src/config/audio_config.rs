use crate::config::default_buffer_frames;

use gpio_recorder_core::CaptureFormat;
use serde::{Deserialize, Serialize};

/// Audio device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Selected audio device name (None = default device).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_device: Option<String>,

    /// Frames per captured buffer.
    #[serde(default = "default_buffer_frames")]
    pub buffer_frames: u32,
}

impl AudioConfig {
    /// Capture format for the configured buffer quantum.
    pub fn capture_format(&self) -> CaptureFormat {
        CaptureFormat::new(self.buffer_frames)
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            selected_device: None,
            buffer_frames: default_buffer_frames(),
        }
    }
}
