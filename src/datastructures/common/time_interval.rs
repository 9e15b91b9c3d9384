use fixed::types::I48F16;

use crate::datastructures::{WireFormat, WireFormatError};

/// The correction field quantity of the message header: a signed count of
/// nanoseconds with 16 fractional bits, carried big endian in 8 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TimeInterval(pub I48F16);

impl TimeInterval {
    pub const ZERO: Self = Self(I48F16::ZERO);

    /// A whole number of nanoseconds
    pub fn from_nanos(nanos: i32) -> Self {
        Self(I48F16::from_num(nanos))
    }

    /// The value in nanoseconds, with the fractional bits truncated away
    pub fn whole_nanos(self) -> i64 {
        self.0.to_num()
    }
}

impl WireFormat for TimeInterval {
    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        let bits = self.0.to_bits().to_be_bytes();
        buffer[0..8].copy_from_slice(&bits);
        Ok(())
    }

    fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        let bits = i64::from_be_bytes(buffer[0..8].try_into().unwrap());
        Ok(Self(I48F16::from_bits(bits)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correction_field_wireformat() {
        // 1000.25 ns
        let value = TimeInterval(I48F16::from_num(1000.25f64));
        let raw = [0x00, 0x00, 0x00, 0x00, 0x03, 0xe8, 0x40, 0x00u8];

        let mut buffer = [0; 8];
        value.serialize(&mut buffer).unwrap();
        assert_eq!(buffer, raw);
        assert_eq!(TimeInterval::deserialize(&raw).unwrap(), value);
    }

    #[test]
    fn negative_corrections_sign_extend() {
        // -0.5 ns
        let value = TimeInterval(I48F16::from_num(-0.5f64));
        let raw = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x80, 0x00u8];

        let mut buffer = [0; 8];
        value.serialize(&mut buffer).unwrap();
        assert_eq!(buffer, raw);
        assert_eq!(TimeInterval::deserialize(&raw).unwrap(), value);
    }

    #[test]
    fn nanosecond_accessors() {
        assert_eq!(TimeInterval::from_nanos(-3).whole_nanos(), -3);
        assert_eq!(TimeInterval::from_nanos(250).whole_nanos(), 250);
        assert_eq!(TimeInterval::ZERO, TimeInterval::default());
    }
}
