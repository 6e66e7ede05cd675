//! gpio-recorder: push-to-toggle audio recorder for single-board computers.
//!
//! A button on a GPIO line starts and stops recording to a timestamped WAV
//! file, an LED shows when recording is active, and the process exits after a
//! period without activity.

mod activation;
mod artifact;
mod button;
mod config;
mod coordinator;
mod error;
mod indicator_state;
mod led_indicator;
mod outcome;
mod recording_state;
mod timer;

pub(crate) use {
    activation::{ActivationMailbox, Debouncer},
    button::ButtonListener,
    coordinator::{Coordinator, CoordinatorParts, wav_file_artifacts},
    error::{AppError, Result as AppResult},
    indicator_state::{Indicator, IndicatorState},
    led_indicator::LedIndicator,
    outcome::Outcome,
    recording_state::RecorderState,
    timer::{Budget, Timer},
};

use crate::{config::Config, outcome::EXIT_STARTUP};

use gpio_recorder_core::{AudioCapturer, AudioError, FaultHandler};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use rppal::gpio::Gpio;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "gpio_recorder=info,gpio_recorder_core=info";

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(EXIT_STARTUP);
        }
    };

    // The audio stream is not Send on every backend, so everything runs on
    // this thread.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(EXIT_STARTUP);
        }
    };

    let code = rt.block_on(async {
        match run(config).await {
            Ok(outcome) => outcome.exit_code(),
            Err(e) => {
                error!("Startup failed: {:?}", e);
                EXIT_STARTUP
            }
        }
    });

    std::process::exit(code);
}

/// Claim the hardware, run the coordinator, release the hardware.
async fn run(config: Config) -> AppResult<Outcome> {
    let gpio = Gpio::new()?;
    let mailbox = Arc::new(ActivationMailbox::new());

    let button = ButtonListener::register(
        &gpio,
        config.gpio.button_pin,
        config.gpio.debounce(),
        Arc::clone(&mailbox),
    )?;
    let indicator = LedIndicator::new(&gpio, config.gpio.led_pin)?;

    let (fault_tx, fault_rx) = mpsc::unbounded_channel::<AudioError>();
    let on_fault: FaultHandler = Arc::new(move |e| {
        // The receiver is gone only after the coordinator has stopped.
        let _ = fault_tx.send(e);
    });

    let format = config.audio.capture_format();
    let capture = AudioCapturer::new(format, config.audio.selected_device.as_deref(), on_fault)
        .map_err(|e| AppError::HardwareInit {
            reason: format!("Audio device: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!(
        sample_rate = capture.sample_rate(),
        buffer_frames = format.buffer_frames(),
        output_dir = ?config.recording.output_dir,
        "Audio capture ready"
    );

    let mut coordinator = Coordinator::new(CoordinatorParts {
        capture,
        indicator,
        mailbox,
        faults: fault_rx,
        timer: config.timeouts.timer(),
        output_dir: config.recording.output_dir.clone(),
        open_artifact: wav_file_artifacts(),
        format,
    });

    let outcome = coordinator.run(shutdown_signal()).await;

    // Release the audio device, the LED and the button line.
    drop(coordinator);
    drop(button);
    info!(exit_code = outcome.exit_code(), "Hardware released, exiting");

    Ok(outcome)
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = ?e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = ?e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
