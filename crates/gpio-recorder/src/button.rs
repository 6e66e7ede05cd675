//! Record button on a GPIO input line.
//!
//! The line is pulled up and the button shorts it to ground, so a press is a
//! falling edge. Edges arrive on rppal's interrupt thread and are handed to
//! the coordinator through the [`ActivationMailbox`].

use crate::{ActivationMailbox, AppResult, Debouncer};

use std::{sync::Arc, time::Duration};

use rppal::gpio::{Event, Gpio, InputPin, Trigger};
use tracing::{debug, info, instrument, trace};

/// Keeps the button interrupt registered while alive.
pub struct ButtonListener {
    pin: InputPin,
}

impl ButtonListener {
    /// Claim `pin` (BCM numbering) and post to `mailbox` on each debounced
    /// press.
    #[track_caller]
    #[instrument(skip(gpio, mailbox))]
    pub fn register(
        gpio: &Gpio,
        pin: u8,
        debounce: Duration,
        mailbox: Arc<ActivationMailbox>,
    ) -> AppResult<Self> {
        let mut pin = gpio.get(pin)?.into_input_pullup();
        let mut debouncer = Debouncer::new(debounce);

        pin.set_async_interrupt(Trigger::FallingEdge, Some(debounce), move |event: Event| {
            if debouncer.accept(event.timestamp) {
                debug!(seqno = event.seqno, "Button activation");
                mailbox.post();
            } else {
                trace!(seqno = event.seqno, "Edge within debounce window ignored");
            }
        })?;

        info!(
            pin = pin.pin(),
            debounce_ms = debounce.as_millis(),
            "Button interrupt registered"
        );

        Ok(Self { pin })
    }
}

impl Drop for ButtonListener {
    fn drop(&mut self) {
        // Best-effort; the pin resets on drop regardless.
        let _ = self.pin.clear_async_interrupt();
    }
}
