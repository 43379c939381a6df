#![no_std]

mod device;
#[cfg(feature = "embedded")]
mod embedded_support;
mod model523;
mod model609;
mod payload;
mod pulse;
mod session;

#[cfg(feature = "embedded")]
pub use embedded_support::read_level;

pub use device::{Device, Device523, Device609};
pub use model523::{classify523, FramingState523, SignalClass523};
pub use model609::{classify609, FramingState609, SignalClass609};
pub use payload::{
    Payload, Status, DEVICE_FREEZER, DEVICE_FRIDGE, DEVICE_OUTDOOR, MODEL_ACURITE523,
    MODEL_ACURITE609, SIGNATURE_FREEZER, SIGNATURE_FRIDGE, TAG,
};
pub use pulse::{PulseEvent, MIN_PULSE_US};
pub use session::{Clock, DeviceStats, Dispatcher, EdgeSource, Session};

/// Bit lengths of the two supported candidate words, re-exported at crate
/// root since `model523`/`model609` both name theirs `BIT_LENGTH`.
pub mod bit_length {
    pub use crate::model523::BIT_LENGTH as ACURITE523;
    pub use crate::model609::BIT_LENGTH as ACURITE609;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("candidate bitstream was empty")]
    EmptyCandidate,
    #[error("device signature did not match")]
    SignatureMismatch,
    #[error("channel did not match the expected outdoor channel")]
    ChannelMismatch,
    #[error("checksum mismatch: expected {expected:#x}, got {actual:#x}")]
    Checksum { expected: u16, actual: u16 },
    #[error("parity check failed")]
    Parity,
    #[error("measurement outside the supported physical range")]
    OutOfRange,
}
