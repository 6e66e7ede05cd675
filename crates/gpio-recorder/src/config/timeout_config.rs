use crate::{
    Timer,
    config::{DEFAULT_IDLE_SECS, DEFAULT_STARTUP_SECS, default_idle_secs, default_startup_secs},
};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Inactivity budgets after which the process exits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Seconds allowed between launch and the first press.
    #[serde(default = "default_startup_secs")]
    pub startup_secs: u64,

    /// Seconds allowed after a recording ends.
    #[serde(default = "default_idle_secs")]
    pub idle_secs: u64,
}

impl TimeoutConfig {
    /// Build a disarmed timer with these budgets.
    pub fn timer(&self) -> Timer {
        Timer::new(
            Duration::from_secs(self.startup_secs),
            Duration::from_secs(self.idle_secs),
        )
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            startup_secs: DEFAULT_STARTUP_SECS,
            idle_secs: DEFAULT_IDLE_SECS,
        }
    }
}
