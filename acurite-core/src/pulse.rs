//! Raw edge-transition events delivered by the radio front end.

/// Below this, a pulse is receiver noise rather than a real transition.
/// Hosts should drop edges shorter than this before constructing a
/// `PulseEvent`; see the host-responsibility note below.
pub const MIN_PULSE_US: u32 = 100;

/// One edge-transition event from the receiver's data pin.
///
/// `level` is the logical level that *just ended* (0 or 1) and `duration_us`
/// is the time since the previous transition of the opposite level. Hosts
/// are responsible for edge detection (XOR against the previous level) and
/// for discarding pulses with `duration_us < 100` before handing the event
/// to a model's `parse_rf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseEvent {
    pub level: u8,
    pub duration_us: u32,
}

impl PulseEvent {
    pub fn new(level: u8, duration_us: u32) -> Self {
        Self { level, duration_us }
    }
}
