//! The PTP message set and its codec

pub(crate) use announce::*;
pub use control_field::ControlField;
pub(crate) use delay_req::*;
pub(crate) use delay_resp::*;
pub use flag_field::FlagField;
pub(crate) use follow_up::*;
pub use header::*;
pub(crate) use sync::*;

use super::{common::PortIdentity, WireFormat, WireFormatError};
use crate::time::{Interval, Time};

mod announce;
mod control_field;
mod delay_req;
mod delay_resp;
mod flag_field;
mod follow_up;
mod header;
mod sync;

/// Maximum length of a packet
///
/// This can be used to preallocate buffers that can always fit packets sent
/// by `oclock`.
pub const MAX_DATA_LEN: usize = 1024;

/// The type nibble of a PTP message, encoded in the first byte of the header
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    num_enum::TryFromPrimitive,
    num_enum::IntoPrimitive,
)]
#[repr(u8)]
pub enum MessageType {
    Sync = 0x0,
    DelayReq = 0x1,
    PDelayReq = 0x2,
    PDelayResp = 0x3,
    FollowUp = 0x8,
    DelayResp = 0x9,
    PDelayRespFollowUp = 0xa,
    Announce = 0xb,
    Signaling = 0xc,
    Management = 0xd,
}

/// A decoded PTP frame: the common header plus the message-specific body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Message {
    pub(crate) header: Header,
    pub(crate) body: MessageBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MessageBody {
    Sync(SyncMessage),
    DelayReq(DelayReqMessage),
    FollowUp(FollowUpMessage),
    DelayResp(DelayRespMessage),
    Announce(AnnounceMessage),
    /// A message type that is recognized on the wire but plays no role on an
    /// end-to-end ordinary clock port (peer delay, signaling, management).
    Other(MessageType),
}

impl MessageBody {
    fn content_size(&self) -> usize {
        match self {
            MessageBody::Sync(m) => m.content_size(),
            MessageBody::DelayReq(m) => m.content_size(),
            MessageBody::FollowUp(m) => m.content_size(),
            MessageBody::DelayResp(m) => m.content_size(),
            MessageBody::Announce(m) => m.content_size(),
            MessageBody::Other(_) => 0,
        }
    }

    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        match self {
            MessageBody::Sync(m) => m.serialize_content(buffer),
            MessageBody::DelayReq(m) => m.serialize_content(buffer),
            MessageBody::FollowUp(m) => m.serialize_content(buffer),
            MessageBody::DelayResp(m) => m.serialize_content(buffer),
            MessageBody::Announce(m) => m.serialize_content(buffer),
            MessageBody::Other(_) => Ok(()),
        }
    }
}

impl Message {
    /// Build a delay request, ready for egress on the event channel.
    ///
    /// The origin timestamp is left zero. The receiver uses the ingress
    /// hardware timestamp instead, and we keep the egress timestamp that the
    /// transport reports back.
    pub(crate) fn delay_req(
        domain_number: u8,
        source_port_identity: PortIdentity,
        sequence_id: u16,
    ) -> Self {
        let body = DelayReqMessage {
            origin_timestamp: Default::default(),
        };

        let header = Header {
            message_type: MessageType::DelayReq,
            message_length: (Header::WIRE_SIZE + body.content_size()) as u16,
            domain_number,
            source_port_identity,
            sequence_id,
            control_field: ControlField::DelayReq,
            log_message_interval: 0x7f,
            ..Default::default()
        };

        Message {
            header,
            body: MessageBody::DelayReq(body),
        }
    }

    /// Build the response to a received delay request.
    ///
    /// The domain, correction and sequence id are taken over from the
    /// request, and the request's ingress timestamp becomes the
    /// receiveTimestamp of the response.
    pub(crate) fn delay_resp(
        request_header: Header,
        receive_timestamp: Time,
        port_identity: PortIdentity,
        min_delay_req_interval: Interval,
    ) -> Self {
        let body = DelayRespMessage {
            receive_timestamp: receive_timestamp.into(),
            requesting_port_identity: request_header.source_port_identity,
        };

        let header = Header {
            message_type: MessageType::DelayResp,
            message_length: (Header::WIRE_SIZE + body.content_size()) as u16,
            domain_number: request_header.domain_number,
            correction_field: request_header.correction_field,
            source_port_identity: port_identity,
            sequence_id: request_header.sequence_id,
            control_field: ControlField::DelayResp,
            log_message_interval: min_delay_req_interval.log_seconds(),
            ..Default::default()
        };

        Message {
            header,
            body: MessageBody::DelayResp(body),
        }
    }

    /// The byte size on the wire of this message
    pub(crate) fn wire_size(&self) -> usize {
        Header::WIRE_SIZE + self.body.content_size()
    }

    /// Serializes the message into the PTP wire format.
    ///
    /// Returns the used buffer size that contains the message or an error.
    pub(crate) fn serialize(&self, buffer: &mut [u8]) -> Result<usize, WireFormatError> {
        if buffer.len() < self.wire_size() {
            return Err(WireFormatError::BufferTooShort);
        }

        self.header.serialize(&mut buffer[0..Header::WIRE_SIZE])?;
        self.body.serialize(&mut buffer[Header::WIRE_SIZE..])?;

        Ok(self.wire_size())
    }

    /// Deserializes a message from the PTP wire format.
    pub(crate) fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        let header = Header::deserialize(buffer)?;

        if (header.message_length as usize) < Header::WIRE_SIZE {
            return Err(WireFormatError::Invalid);
        }

        // Ensure we have the entire message and ignore potential padding
        let content = buffer
            .get(Header::WIRE_SIZE..header.message_length as usize)
            .ok_or(WireFormatError::BufferTooShort)?;

        let body = match header.message_type {
            MessageType::Sync => MessageBody::Sync(SyncMessage::deserialize_content(content)?),
            MessageType::DelayReq => {
                MessageBody::DelayReq(DelayReqMessage::deserialize_content(content)?)
            }
            MessageType::FollowUp => {
                MessageBody::FollowUp(FollowUpMessage::deserialize_content(content)?)
            }
            MessageType::DelayResp => {
                MessageBody::DelayResp(DelayRespMessage::deserialize_content(content)?)
            }
            MessageType::Announce => {
                MessageBody::Announce(AnnounceMessage::deserialize_content(header, content)?)
            }
            other => MessageBody::Other(other),
        };

        Ok(Message { header, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastructures::common::ClockIdentity;

    fn test_identity() -> PortIdentity {
        PortIdentity {
            clock_identity: ClockIdentity([1, 2, 3, 4, 5, 6, 7, 8]),
            port_number: 1,
        }
    }

    #[test]
    fn delay_req_roundtrip() {
        let message = Message::delay_req(3, test_identity(), 0x1234);

        let mut buffer = [0; MAX_DATA_LEN];
        let length = message.serialize(&mut buffer).unwrap();
        assert_eq!(length, 44);

        let decoded = Message::deserialize(&buffer[..length]).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(decoded.header.log_message_interval, 0x7f);
        assert_eq!(decoded.header.control_field, ControlField::DelayReq);
    }

    #[test]
    fn delay_resp_takes_over_request_fields() {
        let request = Message::delay_req(3, test_identity(), 7);
        let response = Message::delay_resp(
            request.header,
            Time::from_nanos(12345),
            PortIdentity::default(),
            Interval::from_log_seconds(0),
        );

        assert_eq!(response.header.domain_number, 3);
        assert_eq!(response.header.sequence_id, 7);

        match response.body {
            MessageBody::DelayResp(body) => {
                assert_eq!(body.requesting_port_identity, test_identity());
                assert_eq!(Time::from(body.receive_timestamp), Time::from_nanos(12345));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn unhandled_types_decode_without_payload() {
        let mut buffer = [0; MAX_DATA_LEN];
        let template = Message::delay_req(0, test_identity(), 1);
        let length = template.serialize(&mut buffer).unwrap();

        // Rewrite the type nibble into a peer delay request
        buffer[0] = (buffer[0] & 0xf0) | u8::from(MessageType::PDelayReq);

        let decoded = Message::deserialize(&buffer[..length]).unwrap();
        assert_eq!(decoded.body, MessageBody::Other(MessageType::PDelayReq));
    }

    #[test]
    fn truncated_message_is_rejected() {
        let mut buffer = [0; MAX_DATA_LEN];
        let length = Message::delay_req(0, test_identity(), 1)
            .serialize(&mut buffer)
            .unwrap();

        assert!(Message::deserialize(&buffer[..length - 1]).is_err());
        assert!(Message::deserialize(&buffer[..10]).is_err());
    }
}
