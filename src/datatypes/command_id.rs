// ABOUTME: Defines SMPP v3.4 command identifiers per specification Table 4-1
// ABOUTME: Implements the response-bit pairing used for automatic responses

use num_enum::TryFromPrimitive;

/// SMPP v3.4 Command Identifiers (Table 4-1)
///
/// The command_id field identifies the SMPP PDU type. Bit 31 is the response
/// indicator: a response command id is its request id OR'd with 0x8000_0000.
#[derive(TryFromPrimitive)]
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandId {
    GenericNack = 0x8000_0000,

    BindReceiver = 0x0000_0001,
    BindReceiverResp = 0x8000_0001,
    BindTransmitter = 0x0000_0002,
    BindTransmitterResp = 0x8000_0002,

    QuerySm = 0x0000_0003,
    QuerySmResp = 0x8000_0003,
    SubmitSm = 0x0000_0004,
    SubmitSmResp = 0x8000_0004,
    DeliverSm = 0x0000_0005,
    DeliverSmResp = 0x8000_0005,

    Unbind = 0x0000_0006,
    UnbindResp = 0x8000_0006,

    ReplaceSm = 0x0000_0007,
    ReplaceSmResp = 0x8000_0007,
    CancelSm = 0x0000_0008,
    CancelSmResp = 0x8000_0008,

    BindTransceiver = 0x0000_0009,
    BindTransceiverResp = 0x8000_0009,

    // 0x0000000A and 0x8000000A-0x80000014 are reserved
    Outbind = 0x0000_000B,

    EnquireLink = 0x0000_0015,
    EnquireLinkResp = 0x8000_0015,

    SubmitMulti = 0x0000_0021,
    SubmitMultiResp = 0x8000_0021,

    AlertNotification = 0x0000_0102,
    // 0x80000102 is reserved; alert_notification has no response PDU
    DataSm = 0x0000_0103,
    DataSmResp = 0x8000_0103,
}

impl CommandId {
    /// True when bit 31 is set, i.e. this id names a response PDU.
    pub fn is_response(self) -> bool {
        (self as u32) & 0x8000_0000 != 0
    }

    /// The response command id paired with this request, if the protocol
    /// defines one. Responses, `alert_notification` and `outbind` have none.
    pub fn response_pair(self) -> Option<CommandId> {
        if self.is_response() {
            return None;
        }
        match self {
            CommandId::AlertNotification | CommandId::Outbind => None,
            other => CommandId::try_from(other as u32 | 0x8000_0000).ok(),
        }
    }

    /// The lowercase command name as the specification spells it.
    pub fn name(self) -> &'static str {
        match self {
            CommandId::GenericNack => "generic_nack",
            CommandId::BindReceiver => "bind_receiver",
            CommandId::BindReceiverResp => "bind_receiver_resp",
            CommandId::BindTransmitter => "bind_transmitter",
            CommandId::BindTransmitterResp => "bind_transmitter_resp",
            CommandId::QuerySm => "query_sm",
            CommandId::QuerySmResp => "query_sm_resp",
            CommandId::SubmitSm => "submit_sm",
            CommandId::SubmitSmResp => "submit_sm_resp",
            CommandId::DeliverSm => "deliver_sm",
            CommandId::DeliverSmResp => "deliver_sm_resp",
            CommandId::Unbind => "unbind",
            CommandId::UnbindResp => "unbind_resp",
            CommandId::ReplaceSm => "replace_sm",
            CommandId::ReplaceSmResp => "replace_sm_resp",
            CommandId::CancelSm => "cancel_sm",
            CommandId::CancelSmResp => "cancel_sm_resp",
            CommandId::BindTransceiver => "bind_transceiver",
            CommandId::BindTransceiverResp => "bind_transceiver_resp",
            CommandId::Outbind => "outbind",
            CommandId::EnquireLink => "enquire_link",
            CommandId::EnquireLinkResp => "enquire_link_resp",
            CommandId::SubmitMulti => "submit_multi",
            CommandId::SubmitMultiResp => "submit_multi_resp",
            CommandId::AlertNotification => "alert_notification",
            CommandId::DataSm => "data_sm",
            CommandId::DataSmResp => "data_sm_resp",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_bit() {
        assert!(!CommandId::SubmitSm.is_response());
        assert!(CommandId::SubmitSmResp.is_response());
        assert!(CommandId::GenericNack.is_response());
    }

    #[test]
    fn response_pairing() {
        assert_eq!(
            CommandId::SubmitSm.response_pair(),
            Some(CommandId::SubmitSmResp)
        );
        assert_eq!(
            CommandId::EnquireLink.response_pair(),
            Some(CommandId::EnquireLinkResp)
        );
        assert_eq!(CommandId::AlertNotification.response_pair(), None);
        assert_eq!(CommandId::Outbind.response_pair(), None);
        assert_eq!(CommandId::SubmitSmResp.response_pair(), None);
    }

    #[test]
    fn raw_values_match_spec() {
        assert_eq!(CommandId::BindReceiver as u32, 0x0000_0001);
        assert_eq!(CommandId::SubmitSm as u32, 0x0000_0004);
        assert_eq!(CommandId::DataSm as u32, 0x0000_0103);
        assert_eq!(CommandId::try_from(0x8000_0004), Ok(CommandId::SubmitSmResp));
        assert!(CommandId::try_from(0x0000_000A_u32).is_err());
    }
}
