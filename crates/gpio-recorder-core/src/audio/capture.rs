use crate::{AudioError, CaptureFormat, CoreResult, DeliveryGate, FaultHandler, SessionWriter};

use std::{panic::Location, sync::Arc};

use cpal::{
    Device, Host, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// A source of captured audio buffers that can be bound to a session.
pub trait CaptureChannel {
    /// Bind future buffer deliveries to `session` and begin delivering.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying device cannot be started. The channel
    /// is left unbound in that case.
    fn start(&mut self, session: Arc<SessionWriter>) -> CoreResult<()>;

    /// Stop delivering. No buffer reaches the previously bound session after
    /// this returns.
    fn stop(&mut self);
}

/// CPAL-backed capture channel.
///
/// The input stream is built once, paused, and then played or paused on each
/// session; the device is never reopened.
pub struct AudioCapturer {
    config: StreamConfig,
    stream: Stream,
    gate: Arc<DeliveryGate>,
}

impl AudioCapturer {
    /// Open the input device and build a paused stream in `format`.
    ///
    /// `device_name` selects a specific input device; `None` uses the host
    /// default.
    ///
    /// # Errors
    ///
    /// Returns error if no input device is found or the device rejects the
    /// format.
    #[track_caller]
    #[instrument(skip(on_fault))]
    pub fn new(
        format: CaptureFormat,
        device_name: Option<&str>,
        on_fault: FaultHandler,
    ) -> CoreResult<Self> {
        let location = Location::caller();
        let host = cpal::default_host();
        let device = select_device(&host, device_name).ok_or(AudioError::NoMicrophoneFound {
            location: ErrorLocation::from(location),
        })?;

        let config = format.stream_config();
        let gate = Arc::new(DeliveryGate::new(on_fault));
        let callback_gate = Arc::clone(&gate);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    callback_gate.deliver(data);
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(location),
            })?;

        // Some backends start streams on creation.
        if let Err(e) = stream.pause() {
            debug!(error = %e, "Stream could not be paused after build");
        }

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate,
            channels = config.channels,
            buffer_frames = format.buffer_frames(),
            "AudioCapturer initialized"
        );

        Ok(Self {
            config,
            stream,
            gate,
        })
    }

    /// Sample rate the stream was opened with.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }
}

impl CaptureChannel for AudioCapturer {
    #[track_caller]
    #[instrument(skip(self, session), fields(path = ?session.path()))]
    fn start(&mut self, session: Arc<SessionWriter>) -> CoreResult<()> {
        self.gate.bind(session)?;

        if let Err(e) = self.stream.play() {
            self.gate.unbind();
            return Err(AudioError::DeviceError {
                reason: format!("Failed to start stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        info!("Audio capture started");
        Ok(())
    }

    #[instrument(skip(self))]
    fn stop(&mut self) {
        // Unbind before pausing: no buffer reaches the session after this.
        self.gate.unbind();

        if let Err(e) = self.stream.pause() {
            warn!(error = %e, "Failed to pause stream; buffers will be discarded");
        }

        info!("Audio capture stopped");
    }
}

fn select_device(host: &Host, device_name: Option<&str>) -> Option<Device> {
    let Some(wanted) = device_name else {
        return host.default_input_device();
    };

    let devices = match host.input_devices() {
        Ok(devices) => devices,
        Err(e) => {
            error!(error = %e, "Failed to enumerate input devices");
            return None;
        }
    };

    #[allow(deprecated)]
    let found = devices
        .into_iter()
        .find(|device| device.name().is_ok_and(|name| name == wanted));

    if found.is_none() {
        warn!(device = wanted, "Configured input device not found");
    }
    found
}
