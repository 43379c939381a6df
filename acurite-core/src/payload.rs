//! The wire-stable record emitted for every successfully decoded transmission.

use core::fmt;

/// Fixed tag identifying this payload format to downstream transports.
pub const TAG: u32 = 0x3807_3162;

pub const MODEL_ACURITE523: u16 = 1592;
pub const MODEL_ACURITE609: u16 = 6585;

pub const DEVICE_FREEZER: u16 = 9690;
pub const DEVICE_FRIDGE: u16 = 7784;
pub const DEVICE_OUTDOOR: u16 = 8501;

/// Empirically discovered, immutable 00523 device signatures.
pub const SIGNATURE_FREEZER: u16 = 0xC049;
pub const SIGNATURE_FRIDGE: u16 = 0xC07C;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Unknown = 0,
    Ok = 1,
    ReadFail = 2,
    Timeout = 3,
    NoData = 4,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Unknown => "unknown",
            Status::Ok => "ok",
            Status::ReadFail => "read-fail",
            Status::Timeout => "timeout",
            Status::NoData => "no-data",
        };
        f.write_str(name)
    }
}

fn model_name(model: u16) -> &'static str {
    match model {
        MODEL_ACURITE523 => "AcuRite 00523",
        MODEL_ACURITE609 => "AcuRite 00609",
        _ => "unknown model",
    }
}

fn device_name(device: u16) -> &'static str {
    match device {
        DEVICE_FREEZER => "freezer",
        DEVICE_FRIDGE => "fridge",
        DEVICE_OUTDOOR => "outdoor",
        _ => "unknown device",
    }
}

/// The 14-byte packed record this system emits on every successful decode.
///
/// `temperature` and `humidity` are tenths of their physical unit;
/// `humidity` is always zero for 00523 devices, which do not report it.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Payload {
    pub tag: u32,
    pub model: u16,
    pub device: u16,
    pub status: u8,
    pub battery: u8,
    pub temperature: i16,
    pub humidity: i16,
}

impl Payload {
    pub fn new(
        model: u16,
        device: u16,
        status: Status,
        battery: u8,
        temperature_c: f32,
        humidity_pct: f32,
    ) -> Self {
        Self {
            tag: TAG,
            model,
            device,
            status: status as u8,
            battery,
            temperature: (temperature_c * 10.0).round() as i16,
            humidity: (humidity_pct * 10.0).round() as i16,
        }
    }

    /// Pack this record into its 14-byte little-endian wire representation.
    pub fn to_bytes(&self) -> [u8; 14] {
        let tag = self.tag;
        let model = self.model;
        let device = self.device;
        let temperature = self.temperature;
        let humidity = self.humidity;

        let mut buf = [0u8; 14];
        buf[0..4].copy_from_slice(&tag.to_le_bytes());
        buf[4..6].copy_from_slice(&model.to_le_bytes());
        buf[6..8].copy_from_slice(&device.to_le_bytes());
        buf[8] = self.status;
        buf[9] = self.battery;
        buf[10..12].copy_from_slice(&temperature.to_le_bytes());
        buf[12..14].copy_from_slice(&humidity.to_le_bytes());
        buf
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.model;
        let device = self.device;
        let status = self.status;
        let battery = self.battery;
        let temperature = self.temperature;
        let humidity = self.humidity;
        write!(
            f,
            concat!(
                "Payload:\n\t",
                "Model: {}\n\t",
                "Device: {}\n\t",
                "Status: {}\n\t",
                "Battery: {}\n\t",
                "Temperature: {}C\n\t",
                "Humidity: {}%\n",
            ),
            model_name(model),
            device_name(device),
            Status::try_from(status).unwrap_or(Status::Unknown),
            battery,
            temperature as f32 / 10.0,
            humidity as f32 / 10.0,
        )
    }
}

impl TryFrom<u8> for Status {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Status::Unknown),
            1 => Ok(Status::Ok),
            2 => Ok(Status::ReadFail),
            3 => Ok(Status::Timeout),
            4 => Ok(Status::NoData),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn packs_to_fourteen_bytes_little_endian() {
        let payload = Payload::new(MODEL_ACURITE523, DEVICE_FREEZER, Status::Ok, 0, -18.444_44, 0.0);
        let bytes = payload.to_bytes();
        assert_eq!(bytes.len(), 14);
        assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), TAG);
        assert_eq!(u16::from_le_bytes(bytes[4..6].try_into().unwrap()), MODEL_ACURITE523);
        assert_eq!(u16::from_le_bytes(bytes[6..8].try_into().unwrap()), DEVICE_FREEZER);
        assert_eq!(bytes[8], Status::Ok as u8);
        assert_eq!(bytes[9], 0);
        let temperature = i16::from_le_bytes(bytes[10..12].try_into().unwrap());
        assert_eq!(temperature, -184); // rounds toward zero from -184.4444
        let humidity = i16::from_le_bytes(bytes[12..14].try_into().unwrap());
        assert_eq!(humidity, 0);
    }

    #[test]
    fn humidity_is_tenths_of_a_percent() {
        let payload = Payload::new(MODEL_ACURITE609, DEVICE_OUTDOOR, Status::Ok, 0, 34.7, 37.0);
        assert_eq!(payload.humidity, 370);
        assert_eq!(payload.temperature, 347);
    }

    /// A fixed-size `core::fmt::Write` sink, since this crate stays
    /// allocation-free even in its own test suite.
    struct FixedBuf {
        bytes: [u8; 256],
        len: usize,
    }

    impl fmt::Write for FixedBuf {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            let end = self.len + s.len();
            self.bytes[self.len..end].copy_from_slice(s.as_bytes());
            self.len = end;
            Ok(())
        }
    }

    impl FixedBuf {
        fn as_str(&self) -> &str {
            core::str::from_utf8(&self.bytes[..self.len]).unwrap()
        }
    }

    #[test]
    fn display_renders_human_readable_fields() {
        use core::fmt::Write as _;

        let payload = Payload::new(MODEL_ACURITE609, DEVICE_OUTDOOR, Status::Ok, 2, 34.7, 37.0);
        let mut buf = FixedBuf {
            bytes: [0u8; 256],
            len: 0,
        };
        write!(buf, "{}", payload).unwrap();
        let rendered = buf.as_str();
        assert!(rendered.contains("AcuRite 00609"));
        assert!(rendered.contains("outdoor"));
        assert!(rendered.contains("ok"));
        assert!(rendered.contains("34.7C"));
        assert!(rendered.contains("37%"));
    }
}
