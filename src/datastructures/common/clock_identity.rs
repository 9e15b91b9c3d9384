use crate::datastructures::{WireFormat, WireFormatError};

/// The EUI-64 that identifies a PTP clock within its domain.
///
/// Every instance carries exactly one of these, commonly derived from a mac
/// address of the device (*IEEE1588-2019 section 7.5.2.2.2*). Two ports
/// belong to the same instance exactly when their clock identities match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockIdentity(pub [u8; 8]);

impl WireFormat for ClockIdentity {
    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        buffer[..8].copy_from_slice(&self.0);
        Ok(())
    }

    fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        let mut identity = [0; 8];
        identity.copy_from_slice(&buffer[..8]);
        Ok(Self(identity))
    }
}

/// The conventional dotted notation, e.g. `001b21.fffe.60abcd`
impl core::fmt::Display for ClockIdentity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let id = &self.0;
        write!(
            f,
            "{:02x}{:02x}{:02x}.{:02x}{:02x}.{:02x}{:02x}{:02x}",
            id[0], id[1], id[2], id[3], id[4], id[5], id[6], id[7]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_roundtrip() {
        let identity = ClockIdentity([0x00, 0x1b, 0x21, 0xff, 0xfe, 0x60, 0xab, 0xcd]);

        let mut buffer = [0; 8];
        identity.serialize(&mut buffer).unwrap();
        assert_eq!(buffer, identity.0);
        assert_eq!(ClockIdentity::deserialize(&buffer).unwrap(), identity);
    }

    #[test]
    fn display_uses_dotted_notation() {
        let identity = ClockIdentity([0x00, 0x1b, 0x21, 0xff, 0xfe, 0x60, 0xab, 0xcd]);
        assert_eq!(identity.to_string(), "001b21.fffe.60abcd");
    }
}
