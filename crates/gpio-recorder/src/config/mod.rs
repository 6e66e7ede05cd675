mod audio_config;
#[allow(clippy::module_inception)]
mod config;
mod gpio_config;
mod recording_config;
mod timeout_config;

use gpio_recorder_core::CaptureFormat;

pub(crate) use {
    audio_config::AudioConfig, config::Config, gpio_config::GpioConfig,
    recording_config::RecordingConfig, timeout_config::TimeoutConfig,
};

pub(crate) const DEFAULT_BUTTON_PIN: u8 = 2;
pub(crate) const DEFAULT_LED_PIN: u8 = 3;
pub(crate) const DEFAULT_DEBOUNCE_MS: u64 = 200;
pub(crate) const MIN_DEBOUNCE_MS: u64 = 200;
pub(crate) const DEFAULT_STARTUP_SECS: u64 = 3600;
pub(crate) const DEFAULT_IDLE_SECS: u64 = 1800;
/// Longest accepted timeout budget (one year).
pub(crate) const MAX_TIMEOUT_SECS: u64 = 366 * 24 * 60 * 60;

/// Environment variable overriding the config file location.
pub(crate) const CONFIG_PATH_ENV: &str = "GPIO_RECORDER_CONFIG";

pub(crate) fn default_button_pin() -> u8 {
    DEFAULT_BUTTON_PIN
}

pub(crate) fn default_led_pin() -> u8 {
    DEFAULT_LED_PIN
}

pub(crate) fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

pub(crate) fn default_buffer_frames() -> u32 {
    CaptureFormat::DEFAULT_BUFFER_FRAMES
}

pub(crate) fn default_startup_secs() -> u64 {
    DEFAULT_STARTUP_SECS
}

pub(crate) fn default_idle_secs() -> u64 {
    DEFAULT_IDLE_SECS
}

pub(crate) fn default_output_dir() -> std::path::PathBuf {
    std::path::PathBuf::from(".")
}
