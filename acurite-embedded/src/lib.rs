#![no_std]

use acurite_core::{read_level, Dispatcher, Payload, PulseEvent, MIN_PULSE_US};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

/// Fixed polling tick. Both 00523 and 00609 encode their shortest pulse
/// class (~100us) well above this resolution.
const POLL_INTERVAL_US: u32 = 50;

/// Polls a GPIO input pin at a fixed tick, turning level changes into
/// `PulseEvent`s and feeding them straight to a `Dispatcher`.
///
/// Hosts with true edge interrupts should construct `PulseEvent`s directly
/// from their interrupt handler and call `Dispatcher::step` themselves;
/// this type exists for microcontrollers without that facility.
pub struct PollingReceiver<P, D> {
    pin: P,
    delay: D,
    dispatcher: Dispatcher,
    last_level: u8,
    elapsed_us: u32,
}

impl<P: InputPin, D: DelayNs> PollingReceiver<P, D> {
    pub fn new(pin: P, delay: D) -> Self {
        Self {
            pin,
            delay,
            dispatcher: Dispatcher::new_with_defaults(),
            last_level: 0,
            elapsed_us: 0,
        }
    }

    /// Poll once. Returns a decoded `Payload` if this tick completed a
    /// candidate that a registered device accepted.
    pub fn poll(&mut self) -> Result<Option<Payload>, P::Error> {
        self.delay.delay_us(POLL_INTERVAL_US);
        self.elapsed_us = self.elapsed_us.saturating_add(POLL_INTERVAL_US);

        let level = read_level(&mut self.pin)?;
        if level == self.last_level {
            return Ok(None);
        }

        let ended_level = self.last_level;
        let elapsed_us = self.elapsed_us;
        self.last_level = level;
        self.elapsed_us = 0;
        if elapsed_us < MIN_PULSE_US {
            return Ok(None);
        }

        let event = PulseEvent::new(ended_level, elapsed_us);
        Ok(self.dispatcher.step(event))
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}
