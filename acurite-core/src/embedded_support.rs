//! Helpers for hosts built on `embedded-hal`, gated behind the `embedded`
//! feature so the rest of this crate stays free of the dependency.

use embedded_hal::digital::InputPin;

/// Read a GPIO input pin's current level as the `0`/`1` convention used by
/// `PulseEvent`.
pub fn read_level<P: InputPin>(pin: &mut P) -> Result<u8, P::Error> {
    Ok(if pin.is_high()? { 1 } else { 0 })
}
