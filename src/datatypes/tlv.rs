use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;

use crate::codec::DecodeError;

/// Standard optional parameter tags per SMPP v3.4 Table 5-29.
pub mod tags {
    pub const DEST_ADDR_SUBUNIT: u16 = 0x0005;
    pub const DEST_NETWORK_TYPE: u16 = 0x0006;
    pub const DEST_BEARER_TYPE: u16 = 0x0007;
    pub const DEST_TELEMATICS_ID: u16 = 0x0008;
    pub const SOURCE_ADDR_SUBUNIT: u16 = 0x000D;
    pub const SOURCE_NETWORK_TYPE: u16 = 0x000E;
    pub const SOURCE_BEARER_TYPE: u16 = 0x000F;
    pub const SOURCE_TELEMATICS_ID: u16 = 0x0010;
    pub const QOS_TIME_TO_LIVE: u16 = 0x0017;
    pub const PAYLOAD_TYPE: u16 = 0x0019;
    pub const ADDITIONAL_STATUS_INFO_TEXT: u16 = 0x001D;
    pub const RECEIPTED_MESSAGE_ID: u16 = 0x001E;
    pub const MS_MSG_WAIT_FACILITIES: u16 = 0x0030;
    pub const PRIVACY_INDICATOR: u16 = 0x0201;
    pub const SOURCE_SUBADDRESS: u16 = 0x0202;
    pub const DEST_SUBADDRESS: u16 = 0x0203;
    pub const USER_MESSAGE_REFERENCE: u16 = 0x0204;
    pub const USER_RESPONSE_CODE: u16 = 0x0205;
    pub const SOURCE_PORT: u16 = 0x020A;
    pub const DESTINATION_PORT: u16 = 0x020B;
    pub const SAR_MSG_REF_NUM: u16 = 0x020C;
    pub const LANGUAGE_INDICATOR: u16 = 0x020D;
    pub const SAR_TOTAL_SEGMENTS: u16 = 0x020E;
    pub const SAR_SEGMENT_SEQNUM: u16 = 0x020F;
    pub const SC_INTERFACE_VERSION: u16 = 0x0210;
    pub const CALLBACK_NUM_PRES_IND: u16 = 0x0302;
    pub const CALLBACK_NUM_ATAG: u16 = 0x0303;
    pub const NUMBER_OF_MESSAGES: u16 = 0x0304;
    pub const CALLBACK_NUM: u16 = 0x0381;
    pub const DPF_RESULT: u16 = 0x0420;
    pub const SET_DPF: u16 = 0x0421;
    pub const MS_AVAILABILITY_STATUS: u16 = 0x0422;
    pub const NETWORK_ERROR_CODE: u16 = 0x0423;
    pub const MESSAGE_PAYLOAD: u16 = 0x0424;
    pub const DELIVERY_FAILURE_REASON: u16 = 0x0425;
    pub const MORE_MESSAGES_TO_SEND: u16 = 0x0426;
    pub const MESSAGE_STATE: u16 = 0x0427;
    pub const USSD_SERVICE_OP: u16 = 0x0501;
    pub const DISPLAY_TIME: u16 = 0x1201;
    pub const SMS_SIGNAL: u16 = 0x1203;
    pub const MS_VALIDITY: u16 = 0x1204;
    pub const ALERT_ON_MESSAGE_DELIVERY: u16 = 0x130C;
    pub const ITS_REPLY_TYPE: u16 = 0x1380;
    pub const ITS_SESSION_INFO: u16 = 0x1383;
}

/// A raw Tag-Length-Value optional parameter.
///
/// Tags the command schema does not recognize survive decoding in this form
/// so that re-encoding a PDU reproduces the original frame byte for byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tlv {
    pub tag: u16,
    pub value: Bytes,
}

impl Tlv {
    pub fn new(tag: u16, value: impl Into<Bytes>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }

    /// Wire size: 2-byte tag, 2-byte length, then the value.
    pub fn encoded_len(&self) -> usize {
        4 + self.value.len()
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.tag);
        buf.put_u16(self.value.len() as u16);
        buf.put_slice(&self.value);
    }

    pub fn decode(cur: &mut Cursor<&[u8]>) -> Result<Self, DecodeError> {
        if cur.remaining() < 4 {
            return Err(DecodeError::TrailingBytes {
                remaining: cur.remaining(),
            });
        }
        let tag = cur.get_u16();
        let length = cur.get_u16() as usize;
        if cur.remaining() < length {
            return Err(DecodeError::TruncatedTlv { tag });
        }
        let value = cur.copy_to_bytes(length);
        Ok(Self { tag, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_layout() {
        let tlv = Tlv::new(0x1401, Bytes::from_static(&[0xF4, 0xE0]));
        let mut buf = BytesMut::new();
        tlv.encode(&mut buf);
        assert_eq!(buf.as_ref(), &[0x14, 0x01, 0x00, 0x02, 0xF4, 0xE0]);
        assert_eq!(tlv.encoded_len(), 6);
    }

    #[test]
    fn decode_roundtrip() {
        let raw = [0x02, 0x04, 0x00, 0x02, 0x12, 0x34];
        let mut cur = Cursor::new(&raw[..]);
        let tlv = Tlv::decode(&mut cur).unwrap();
        assert_eq!(tlv.tag, tags::USER_MESSAGE_REFERENCE);
        assert_eq!(tlv.value.as_ref(), &[0x12, 0x34]);
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn decode_truncated_value() {
        let raw = [0x02, 0x04, 0x00, 0x05, 0x12];
        let mut cur = Cursor::new(&raw[..]);
        assert!(matches!(
            Tlv::decode(&mut cur),
            Err(DecodeError::TruncatedTlv { tag: 0x0204 })
        ));
    }

    #[test]
    fn decode_dangling_header() {
        let raw = [0x02, 0x04, 0x00];
        let mut cur = Cursor::new(&raw[..]);
        assert!(matches!(
            Tlv::decode(&mut cur),
            Err(DecodeError::TrailingBytes { remaining: 3 })
        ));
    }
}
