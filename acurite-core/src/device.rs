//! Per-device validation: signature, parity/channel, checksum, and physical
//! range checks that promote a candidate bitstream to a latched
//! temperature/humidity/battery reading.

use crate::payload::{
    Payload, Status, DEVICE_FREEZER, DEVICE_FRIDGE, DEVICE_OUTDOOR, MODEL_ACURITE523,
    MODEL_ACURITE609, SIGNATURE_FREEZER, SIGNATURE_FRIDGE,
};
use crate::Error;

/// Common surface for a registered AcuRite device.
///
/// A device owns the last-known reading latched from its most recently
/// accepted candidate; `validate` mutates that latched state only on
/// success.
pub trait Device {
    fn model(&self) -> u16;
    fn id(&self) -> u16;
    fn validate(&mut self, candidate: u64) -> Result<(), Error>;
    fn create_payload(&self, status: Status) -> Payload;
}

/// A 00523 refrigerator/freezer device, identified by a fixed preloaded
/// 16-bit signature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Device523 {
    id: u16,
    signature: u16,
    battery: u8,
    temperature_c: f32,
}

impl Device523 {
    pub fn freezer() -> Self {
        Self {
            id: DEVICE_FREEZER,
            signature: SIGNATURE_FREEZER,
            battery: 0,
            temperature_c: 0.0,
        }
    }

    pub fn fridge() -> Self {
        Self {
            id: DEVICE_FRIDGE,
            signature: SIGNATURE_FRIDGE,
            battery: 0,
            temperature_c: 0.0,
        }
    }

    pub fn battery(&self) -> u8 {
        self.battery
    }

    pub fn temperature_c(&self) -> f32 {
        self.temperature_c
    }
}

impl Device for Device523 {
    fn model(&self) -> u16 {
        MODEL_ACURITE523
    }

    fn id(&self) -> u16 {
        self.id
    }

    fn validate(&mut self, candidate: u64) -> Result<(), Error> {
        if candidate == 0 {
            return Err(Error::EmptyCandidate);
        }

        let signature = ((candidate >> 32) & 0xFFFF) as u16;
        if signature != self.signature {
            return Err(Error::SignatureMismatch);
        }

        let byte_a = ((candidate >> 40) & 0xFF) as u8;
        let byte_b = ((candidate >> 32) & 0xFF) as u8;
        let byte_c = ((candidate >> 24) & 0xFF) as u8;
        let byte_d = ((candidate >> 16) & 0xFF) as u8;
        let byte_e = ((candidate >> 8) & 0xFF) as u8;
        let checksum = (candidate & 0xFF) as u8;

        let expected = byte_a
            .wrapping_add(byte_b)
            .wrapping_add(byte_c)
            .wrapping_add(byte_d)
            .wrapping_add(byte_e);
        if expected != checksum {
            return Err(Error::Checksum {
                expected: expected as u16,
                actual: checksum as u16,
            });
        }

        let parity2 = ((candidate >> 23) & 0x1) as u32;
        let data2 = ((candidate >> 16) & 0x7F) as u8;
        if data2.count_ones() % 2 != parity2 {
            return Err(Error::Parity);
        }

        let parity1 = ((candidate >> 15) & 0x1) as u32;
        let data1 = ((candidate >> 8) & 0x7F) as u8;
        if data1.count_ones() % 2 != parity1 {
            return Err(Error::Parity);
        }

        let raw = ((data2 as u16) << 7) | (data1 as u16);
        let temp_c = (raw as f32 - 1800.0) / 18.0;
        if !(-40.0..70.0).contains(&temp_c) {
            return Err(Error::OutOfRange);
        }

        self.battery = ((candidate >> 30) & 0b11) as u8;
        self.temperature_c = temp_c;
        Ok(())
    }

    fn create_payload(&self, status: Status) -> Payload {
        Payload::new(self.model(), self.id, status, self.battery, self.temperature_c, 0.0)
    }
}

/// A 00609 outdoor thermometer. Its 8-bit signature is randomized at every
/// power-on, so it is latched from the first accepted candidate rather than
/// preloaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Device609 {
    id: u16,
    signature: Option<u16>,
    battery: u8,
    temperature_c: f32,
    humidity_pct: f32,
}

impl Device609 {
    pub fn outdoor() -> Self {
        Self {
            id: DEVICE_OUTDOOR,
            signature: None,
            battery: 0,
            temperature_c: 0.0,
            humidity_pct: 0.0,
        }
    }

    pub fn battery(&self) -> u8 {
        self.battery
    }

    pub fn temperature_c(&self) -> f32 {
        self.temperature_c
    }

    pub fn humidity_pct(&self) -> f32 {
        self.humidity_pct
    }

    pub fn signature(&self) -> Option<u16> {
        self.signature
    }
}

impl Device for Device609 {
    fn model(&self) -> u16 {
        MODEL_ACURITE609
    }

    fn id(&self) -> u16 {
        self.id
    }

    fn validate(&mut self, candidate: u64) -> Result<(), Error> {
        if candidate == 0 {
            return Err(Error::EmptyCandidate);
        }

        let signature = ((candidate >> 32) & 0xFF) as u16;
        if let Some(known) = self.signature {
            if signature != known {
                return Err(Error::SignatureMismatch);
            }
        }

        let channel = ((candidate >> 28) & 0b11) as u8;
        if channel != 2 {
            return Err(Error::ChannelMismatch);
        }

        let byte1 = ((candidate >> 32) & 0xFF) as u8;
        let byte2 = ((candidate >> 24) & 0xFF) as u8;
        let byte3 = ((candidate >> 16) & 0xFF) as u8;
        let byte4 = ((candidate >> 8) & 0xFF) as u8;
        let checksum = (candidate & 0xFF) as u8;

        let expected = byte1.wrapping_add(byte2).wrapping_add(byte3).wrapping_add(byte4);
        if expected != checksum {
            return Err(Error::Checksum {
                expected: expected as u16,
                actual: checksum as u16,
            });
        }

        let raw = ((candidate >> 15) & 0x1FFF) as u16;
        let signed = if raw & 0x1000 != 0 {
            -((0x2000 - raw as i32) as f32)
        } else {
            raw as f32
        };
        let temp_c = signed / 20.0;

        let hum = ((candidate >> 8) & 0x7F) as u8;
        if !(1..=99).contains(&hum) || !(-40.0..=70.0).contains(&temp_c) {
            return Err(Error::OutOfRange);
        }

        if self.signature.is_none() {
            self.signature = Some(signature);
        }
        self.battery = ((candidate >> 30) & 0b11) as u8;
        self.temperature_c = temp_c;
        self.humidity_pct = hum as f32;
        Ok(())
    }

    fn create_payload(&self, status: Status) -> Payload {
        Payload::new(
            self.model(),
            self.id,
            status,
            self.battery,
            self.temperature_c,
            self.humidity_pct,
        )
    }
}
