//! Status LED on a GPIO output line.

use crate::{AppResult, Indicator, IndicatorState};

use rppal::gpio::{Gpio, OutputPin};
use tracing::{debug, info, instrument};

/// LED driven high while recording and low while idle.
///
/// The pin is reset to its previous mode when dropped.
pub struct LedIndicator {
    pin: OutputPin,
}

impl LedIndicator {
    /// Claim `pin` (BCM numbering) as an output, initially low.
    #[track_caller]
    #[instrument(skip(gpio))]
    pub fn new(gpio: &Gpio, pin: u8) -> AppResult<Self> {
        let pin = gpio.get(pin)?.into_output_low();

        info!(pin = pin.pin(), "Status LED initialized");

        Ok(Self { pin })
    }
}

impl Indicator for LedIndicator {
    fn show(&mut self, state: IndicatorState) {
        match state {
            IndicatorState::On => self.pin.set_high(),
            IndicatorState::Off => self.pin.set_low(),
        }
        debug!(pin = self.pin.pin(), state = ?state, "Status LED updated");
    }
}
