use fixed::types::U96F32;

use crate::{
    datastructures::{WireFormat, WireFormatError},
    time::Time,
};

/// A timestamp in the PTP wire format: 48 bits of seconds and 32 bits of
/// nanoseconds, both big endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WireTimestamp {
    /// The seconds field of the timestamp. 48-bit, must be less than 2^48.
    pub seconds: u64,
    /// The nanoseconds field of the timestamp. Must be less than 10^9.
    pub nanos: u32,
}

impl WireFormat for WireTimestamp {
    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        buffer[0..6].copy_from_slice(&self.seconds.to_be_bytes()[2..8]);
        buffer[6..10].copy_from_slice(&self.nanos.to_be_bytes());
        Ok(())
    }

    fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        let mut seconds = [0; 8];
        seconds[2..8].copy_from_slice(&buffer[0..6]);

        Ok(Self {
            seconds: u64::from_be_bytes(seconds),
            nanos: u32::from_be_bytes(buffer[6..10].try_into().unwrap()),
        })
    }
}

impl From<Time> for WireTimestamp {
    fn from(instant: Time) -> Self {
        WireTimestamp {
            seconds: instant.secs(),
            nanos: instant.subsec_nanos(),
        }
    }
}

impl From<WireTimestamp> for Time {
    fn from(timestamp: WireTimestamp) -> Self {
        Time::from_fixed_nanos(
            U96F32::from_num(timestamp.seconds) * 1_000_000_000u128
                + U96F32::from_num(timestamp.nanos),
        )
    }
}
