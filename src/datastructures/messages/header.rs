use super::{ControlField, FlagField, MessageType};
use crate::datastructures::{
    common::{PortIdentity, TimeInterval},
    WireFormat, WireFormatError,
};

/// The PTP major version implemented by this crate
pub(crate) const VERSION_PTP: u8 = 2;

/// The common 34-byte header carried by every PTP message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub major_sdo_id: u8,
    pub message_type: MessageType,
    pub minor_version_ptp: u8,
    pub version_ptp: u8,
    pub message_length: u16,
    pub domain_number: u8,
    pub minor_sdo_id: u8,
    pub flag_field: FlagField,
    pub correction_field: TimeInterval,
    pub message_type_specific: [u8; 4],
    pub source_port_identity: PortIdentity,
    pub sequence_id: u16,
    pub control_field: ControlField,
    pub log_message_interval: i8,
}

impl Header {
    pub(crate) const WIRE_SIZE: usize = 34;
}

impl Default for Header {
    fn default() -> Self {
        Self {
            major_sdo_id: 0,
            message_type: MessageType::Sync,
            minor_version_ptp: 0,
            version_ptp: VERSION_PTP,
            message_length: Self::WIRE_SIZE as u16,
            domain_number: 0,
            minor_sdo_id: 0,
            flag_field: FlagField::default(),
            correction_field: TimeInterval::default(),
            message_type_specific: [0; 4],
            source_port_identity: PortIdentity::default(),
            sequence_id: 0,
            control_field: ControlField::AllOthers,
            log_message_interval: 0x7f,
        }
    }
}

impl WireFormat for Header {
    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        if buffer.len() < Self::WIRE_SIZE {
            return Err(WireFormatError::BufferTooShort);
        }

        buffer[0] = ((self.major_sdo_id & 0x0f) << 4) | (u8::from(self.message_type) & 0x0f);
        buffer[1] = ((self.minor_version_ptp & 0x0f) << 4) | (self.version_ptp & 0x0f);
        buffer[2..4].copy_from_slice(&self.message_length.to_be_bytes());
        buffer[4] = self.domain_number;
        buffer[5] = self.minor_sdo_id;
        self.flag_field.serialize(&mut buffer[6..8])?;
        self.correction_field.serialize(&mut buffer[8..16])?;
        buffer[16..20].copy_from_slice(&self.message_type_specific);
        self.source_port_identity.serialize(&mut buffer[20..30])?;
        buffer[30..32].copy_from_slice(&self.sequence_id.to_be_bytes());
        buffer[32] = self.control_field.to_primitive();
        buffer[33] = self.log_message_interval as u8;

        Ok(())
    }

    fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        if buffer.len() < Self::WIRE_SIZE {
            return Err(WireFormatError::BufferTooShort);
        }

        Ok(Self {
            major_sdo_id: (buffer[0] >> 4) & 0x0f,
            message_type: MessageType::try_from(buffer[0] & 0x0f)?,
            minor_version_ptp: (buffer[1] >> 4) & 0x0f,
            version_ptp: buffer[1] & 0x0f,
            message_length: u16::from_be_bytes(buffer[2..4].try_into().unwrap()),
            domain_number: buffer[4],
            minor_sdo_id: buffer[5],
            flag_field: FlagField::deserialize(&buffer[6..8])?,
            correction_field: TimeInterval::deserialize(&buffer[8..16])?,
            message_type_specific: buffer[16..20].try_into().unwrap(),
            source_port_identity: PortIdentity::deserialize(&buffer[20..30])?,
            sequence_id: u16::from_be_bytes(buffer[30..32].try_into().unwrap()),
            control_field: ControlField::from_primitive(buffer[32]),
            log_message_interval: buffer[33] as i8,
        })
    }
}

#[cfg(test)]
mod tests {
    use fixed::types::I48F16;

    use super::*;
    use crate::datastructures::common::ClockIdentity;

    #[test]
    fn header_wireformat() {
        let representations = [(
            [
                0x59, 0x02, 0x12, 0x34, 0xaa, 0x00, 0b0100_0101, 0b0010_1010, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x01, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04,
                0x05, 0x06, 0x07, 0x55, 0x55, 0xde, 0xad, 0x03, 0x16,
            ],
            Header {
                major_sdo_id: 0x5,
                message_type: MessageType::DelayResp,
                minor_version_ptp: 0x0,
                version_ptp: 0x2,
                message_length: 0x1234,
                domain_number: 0xaa,
                minor_sdo_id: 0x00,
                flag_field: FlagField {
                    alternate_master_flag: true,
                    unicast_flag: true,
                    ptp_profile_specific_2: true,
                    leap59: true,
                    ptp_timescale: true,
                    frequency_tracable: true,
                    ..Default::default()
                },
                correction_field: TimeInterval(I48F16::from_num(1.5f64)),
                message_type_specific: [0; 4],
                source_port_identity: PortIdentity {
                    clock_identity: ClockIdentity([0, 1, 2, 3, 4, 5, 6, 7]),
                    port_number: 0x5555,
                },
                sequence_id: 0xdead,
                control_field: ControlField::DelayResp,
                log_message_interval: 0x16,
            },
        )];

        for (byte_representation, object_representation) in representations {
            // Test the serialization output
            let mut serialization_buffer = [0; 34];
            object_representation
                .serialize(&mut serialization_buffer)
                .unwrap();
            assert_eq!(serialization_buffer, byte_representation);

            // Test the deserialization output
            let deserialized_data = Header::deserialize(&byte_representation).unwrap();
            assert_eq!(deserialized_data, object_representation);
        }
    }

    #[test]
    fn negative_log_message_interval() {
        let header = Header {
            log_message_interval: -3,
            ..Default::default()
        };

        let mut buffer = [0; 34];
        header.serialize(&mut buffer).unwrap();
        assert_eq!(buffer[33], 0xfd);
        assert_eq!(
            Header::deserialize(&buffer).unwrap().log_message_interval,
            -3
        );
    }
}
