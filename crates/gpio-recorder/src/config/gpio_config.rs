use crate::config::{
    DEFAULT_BUTTON_PIN, DEFAULT_DEBOUNCE_MS, DEFAULT_LED_PIN, default_button_pin,
    default_debounce_ms, default_led_pin,
};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// GPIO line assignment (BCM numbering).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpioConfig {
    /// Record button input, pulled up, active low.
    #[serde(default = "default_button_pin")]
    pub button_pin: u8,

    /// Recording indicator LED output.
    #[serde(default = "default_led_pin")]
    pub led_pin: u8,

    /// Button debounce window in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl GpioConfig {
    /// Debounce window.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            button_pin: DEFAULT_BUTTON_PIN,
            led_pin: DEFAULT_LED_PIN,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}
