use crate::config::default_output_dir;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where session artifacts are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Directory receiving one WAV file per session.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}
