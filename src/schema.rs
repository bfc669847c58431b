//! Command schema registry for the SMPP v3.4 PDU codec.
//!
//! Every command id maps to a static description: its mandatory parameters in
//! wire order and the set of optional TLVs it recognizes. The codec in
//! [`crate::pdu`] is driven entirely by this data; adding a vendor TLV via
//! [`define_optional_param`] extends the parser without touching it.
//!
//! The registry is process-wide and append-only. All
//! [`define_optional_param`] calls must happen during application startup,
//! before any PDU of the affected command type is encoded or decoded; after
//! that the registry is only read.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use thiserror::Error;

use crate::datatypes::{tags, CommandId};

/// Wire type of a single PDU parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    /// NUL-terminated string; `max` includes the terminator octet.
    CString { max: usize },
    /// Raw octets of at most `max`; mandatory occurrences are sized by a
    /// sibling length field, TLV occurrences by the TLV length prefix.
    OctetString { max: usize },
    /// Raw octets of exactly `size`.
    FixedOctetString { size: usize },
    /// Unsigned big-endian integer of 1, 2 or 4 octets.
    Integer { size: usize },
    /// submit_multi destination list, counted by `number_of_dests`.
    DestAddresses,
    /// submit_multi_resp unsuccessful-SME list, counted by `no_unsuccess`.
    UnsuccessSmes,
}

impl ParamType {
    /// Human description used in type-mismatch errors.
    pub(crate) fn expects(self) -> &'static str {
        match self {
            ParamType::CString { .. } => "string",
            ParamType::OctetString { .. } | ParamType::FixedOctetString { .. } => "byte",
            ParamType::Integer { .. } => "integer",
            ParamType::DestAddresses => "destination list",
            ParamType::UnsuccessSmes => "unsuccessful-SME list",
        }
    }
}

/// A mandatory parameter declaration.
#[derive(Clone, Copy, Debug)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ParamType,
    /// Sibling integer parameter holding this parameter's length. Implicitly
    /// recomputed at encode time and consumed at decode time.
    pub len_param: Option<&'static str>,
}

impl ParamSpec {
    const fn cstring(name: &'static str, max: usize) -> Self {
        Self {
            name,
            ty: ParamType::CString { max },
            len_param: None,
        }
    }

    const fn int1(name: &'static str) -> Self {
        Self {
            name,
            ty: ParamType::Integer { size: 1 },
            len_param: None,
        }
    }

    const fn octets(name: &'static str, max: usize, len_param: &'static str) -> Self {
        Self {
            name,
            ty: ParamType::OctetString { max },
            len_param: Some(len_param),
        }
    }

    const fn list(name: &'static str, ty: ParamType, len_param: &'static str) -> Self {
        Self {
            name,
            ty,
            len_param: Some(len_param),
        }
    }
}

/// A recognized optional (TLV) parameter declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlvSpec {
    pub name: String,
    pub tag: u16,
    pub ty: ParamType,
}

impl TlvSpec {
    fn new(name: &str, tag: u16, ty: ParamType) -> Self {
        Self {
            name: name.to_string(),
            tag,
            ty,
        }
    }

    fn int1(name: &str, tag: u16) -> Self {
        Self::new(name, tag, ParamType::Integer { size: 1 })
    }

    fn int2(name: &str, tag: u16) -> Self {
        Self::new(name, tag, ParamType::Integer { size: 2 })
    }

    fn int4(name: &str, tag: u16) -> Self {
        Self::new(name, tag, ParamType::Integer { size: 4 })
    }

    fn cstring(name: &str, tag: u16, max: usize) -> Self {
        Self::new(name, tag, ParamType::CString { max })
    }

    fn octets(name: &str, tag: u16, max: usize) -> Self {
        Self::new(name, tag, ParamType::OctetString { max })
    }

    fn fixed(name: &str, tag: u16, size: usize) -> Self {
        Self::new(name, tag, ParamType::FixedOctetString { size })
    }
}

/// Full schema for one command id.
#[derive(Clone, Debug)]
pub struct CommandSpec {
    pub id: CommandId,
    pub mandatory: Vec<ParamSpec>,
    pub optional: Vec<TlvSpec>,
}

impl CommandSpec {
    fn new(id: CommandId, mandatory: Vec<ParamSpec>, optional: Vec<TlvSpec>) -> Self {
        Self {
            id,
            mandatory,
            optional,
        }
    }

    pub fn mandatory_by_name(&self, name: &str) -> Option<&ParamSpec> {
        self.mandatory.iter().find(|p| p.name == name)
    }

    pub fn tlv_by_name(&self, name: &str) -> Option<&TlvSpec> {
        self.optional.iter().find(|t| t.name == name)
    }

    pub fn tlv_by_tag(&self, tag: u16) -> Option<&TlvSpec> {
        self.optional.iter().find(|t| t.tag == tag)
    }
}

/// Conflicting vendor TLV registration.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("tag {tag:#06x} is already defined for {command:?} as '{existing}'")]
    TagInUse {
        command: CommandId,
        tag: u16,
        existing: String,
    },
    #[error("parameter '{name}' is already defined for {command:?}")]
    NameInUse { command: CommandId, name: String },
}

struct Registry {
    commands: HashMap<CommandId, CommandSpec>,
}

impl Registry {
    fn command(&self, id: CommandId) -> &CommandSpec {
        // standard() inserts a spec for every CommandId variant
        &self.commands[&id]
    }

    fn standard() -> Self {
        let bind_mandatory = || {
            vec![
                ParamSpec::cstring("system_id", 16),
                ParamSpec::cstring("password", 9),
                ParamSpec::cstring("system_type", 13),
                ParamSpec::int1("interface_version"),
                ParamSpec::int1("addr_ton"),
                ParamSpec::int1("addr_npi"),
                ParamSpec::cstring("address_range", 41),
            ]
        };
        let bind_resp_mandatory = || vec![ParamSpec::cstring("system_id", 16)];
        let bind_resp_optional = || {
            vec![TlvSpec::int1(
                "sc_interface_version",
                tags::SC_INTERFACE_VERSION,
            )]
        };

        // shared head of submit_sm and deliver_sm
        let sm_mandatory = || {
            vec![
                ParamSpec::cstring("service_type", 6),
                ParamSpec::int1("source_addr_ton"),
                ParamSpec::int1("source_addr_npi"),
                ParamSpec::cstring("source_addr", 21),
                ParamSpec::int1("dest_addr_ton"),
                ParamSpec::int1("dest_addr_npi"),
                ParamSpec::cstring("destination_addr", 21),
                ParamSpec::int1("esm_class"),
                ParamSpec::int1("protocol_id"),
                ParamSpec::int1("priority_flag"),
                ParamSpec::cstring("schedule_delivery_time", 17),
                ParamSpec::cstring("validity_period", 17),
                ParamSpec::int1("registered_delivery"),
                ParamSpec::int1("replace_if_present_flag"),
                ParamSpec::int1("data_coding"),
                ParamSpec::int1("sm_default_msg_id"),
                ParamSpec::int1("sm_length"),
                ParamSpec::octets("short_message", 254, "sm_length"),
            ]
        };

        let submit_sm_optional = || {
            vec![
                TlvSpec::int2("user_message_reference", tags::USER_MESSAGE_REFERENCE),
                TlvSpec::int2("source_port", tags::SOURCE_PORT),
                TlvSpec::int1("source_addr_subunit", tags::SOURCE_ADDR_SUBUNIT),
                TlvSpec::int2("destination_port", tags::DESTINATION_PORT),
                TlvSpec::int1("dest_addr_subunit", tags::DEST_ADDR_SUBUNIT),
                TlvSpec::int2("sar_msg_ref_num", tags::SAR_MSG_REF_NUM),
                TlvSpec::int1("sar_total_segments", tags::SAR_TOTAL_SEGMENTS),
                TlvSpec::int1("sar_segment_seqnum", tags::SAR_SEGMENT_SEQNUM),
                TlvSpec::int1("more_messages_to_send", tags::MORE_MESSAGES_TO_SEND),
                TlvSpec::int1("payload_type", tags::PAYLOAD_TYPE),
                TlvSpec::octets("message_payload", tags::MESSAGE_PAYLOAD, 65535),
                TlvSpec::int1("privacy_indicator", tags::PRIVACY_INDICATOR),
                TlvSpec::octets("callback_num", tags::CALLBACK_NUM, 19),
                TlvSpec::int1("callback_num_pres_ind", tags::CALLBACK_NUM_PRES_IND),
                TlvSpec::octets("source_subaddress", tags::SOURCE_SUBADDRESS, 23),
                TlvSpec::octets("dest_subaddress", tags::DEST_SUBADDRESS, 23),
                TlvSpec::int1("user_response_code", tags::USER_RESPONSE_CODE),
                TlvSpec::int1("display_time", tags::DISPLAY_TIME),
                TlvSpec::int2("sms_signal", tags::SMS_SIGNAL),
                TlvSpec::int1("ms_validity", tags::MS_VALIDITY),
                TlvSpec::int1("ms_msg_wait_facilities", tags::MS_MSG_WAIT_FACILITIES),
                TlvSpec::int1("number_of_messages", tags::NUMBER_OF_MESSAGES),
                TlvSpec::int1(
                    "alert_on_message_delivery",
                    tags::ALERT_ON_MESSAGE_DELIVERY,
                ),
                TlvSpec::int1("language_indicator", tags::LANGUAGE_INDICATOR),
                TlvSpec::int1("its_reply_type", tags::ITS_REPLY_TYPE),
                TlvSpec::int2("its_session_info", tags::ITS_SESSION_INFO),
                TlvSpec::int1("ussd_service_op", tags::USSD_SERVICE_OP),
            ]
        };

        let deliver_sm_optional = || {
            vec![
                TlvSpec::int2("user_message_reference", tags::USER_MESSAGE_REFERENCE),
                TlvSpec::int2("source_port", tags::SOURCE_PORT),
                TlvSpec::int2("destination_port", tags::DESTINATION_PORT),
                TlvSpec::int2("sar_msg_ref_num", tags::SAR_MSG_REF_NUM),
                TlvSpec::int1("sar_total_segments", tags::SAR_TOTAL_SEGMENTS),
                TlvSpec::int1("sar_segment_seqnum", tags::SAR_SEGMENT_SEQNUM),
                TlvSpec::int1("user_response_code", tags::USER_RESPONSE_CODE),
                TlvSpec::int1("privacy_indicator", tags::PRIVACY_INDICATOR),
                TlvSpec::int1("payload_type", tags::PAYLOAD_TYPE),
                TlvSpec::octets("message_payload", tags::MESSAGE_PAYLOAD, 65535),
                TlvSpec::octets("callback_num", tags::CALLBACK_NUM, 19),
                TlvSpec::octets("source_subaddress", tags::SOURCE_SUBADDRESS, 23),
                TlvSpec::octets("dest_subaddress", tags::DEST_SUBADDRESS, 23),
                TlvSpec::int1("language_indicator", tags::LANGUAGE_INDICATOR),
                TlvSpec::int2("its_session_info", tags::ITS_SESSION_INFO),
                TlvSpec::fixed("network_error_code", tags::NETWORK_ERROR_CODE, 3),
                TlvSpec::int1("message_state", tags::MESSAGE_STATE),
                TlvSpec::cstring("receipted_message_id", tags::RECEIPTED_MESSAGE_ID, 65),
                TlvSpec::int1("source_network_type", tags::SOURCE_NETWORK_TYPE),
                TlvSpec::int1("dest_network_type", tags::DEST_NETWORK_TYPE),
                TlvSpec::int1("more_messages_to_send", tags::MORE_MESSAGES_TO_SEND),
            ]
        };

        let data_sm_optional = || {
            vec![
                TlvSpec::int2("source_port", tags::SOURCE_PORT),
                TlvSpec::int1("source_addr_subunit", tags::SOURCE_ADDR_SUBUNIT),
                TlvSpec::int1("source_network_type", tags::SOURCE_NETWORK_TYPE),
                TlvSpec::int1("source_bearer_type", tags::SOURCE_BEARER_TYPE),
                TlvSpec::int2("source_telematics_id", tags::SOURCE_TELEMATICS_ID),
                TlvSpec::int2("destination_port", tags::DESTINATION_PORT),
                TlvSpec::int1("dest_addr_subunit", tags::DEST_ADDR_SUBUNIT),
                TlvSpec::int1("dest_network_type", tags::DEST_NETWORK_TYPE),
                TlvSpec::int1("dest_bearer_type", tags::DEST_BEARER_TYPE),
                TlvSpec::int2("dest_telematics_id", tags::DEST_TELEMATICS_ID),
                TlvSpec::int2("sar_msg_ref_num", tags::SAR_MSG_REF_NUM),
                TlvSpec::int1("sar_total_segments", tags::SAR_TOTAL_SEGMENTS),
                TlvSpec::int1("sar_segment_seqnum", tags::SAR_SEGMENT_SEQNUM),
                TlvSpec::int1("more_messages_to_send", tags::MORE_MESSAGES_TO_SEND),
                TlvSpec::int4("qos_time_to_live", tags::QOS_TIME_TO_LIVE),
                TlvSpec::int1("payload_type", tags::PAYLOAD_TYPE),
                TlvSpec::octets("message_payload", tags::MESSAGE_PAYLOAD, 65535),
                TlvSpec::cstring("receipted_message_id", tags::RECEIPTED_MESSAGE_ID, 65),
                TlvSpec::int1("message_state", tags::MESSAGE_STATE),
                TlvSpec::fixed("network_error_code", tags::NETWORK_ERROR_CODE, 3),
                TlvSpec::int2("user_message_reference", tags::USER_MESSAGE_REFERENCE),
                TlvSpec::int1("privacy_indicator", tags::PRIVACY_INDICATOR),
                TlvSpec::octets("callback_num", tags::CALLBACK_NUM, 19),
                TlvSpec::int1("callback_num_pres_ind", tags::CALLBACK_NUM_PRES_IND),
                TlvSpec::cstring("callback_num_atag", tags::CALLBACK_NUM_ATAG, 65),
                TlvSpec::octets("source_subaddress", tags::SOURCE_SUBADDRESS, 23),
                TlvSpec::octets("dest_subaddress", tags::DEST_SUBADDRESS, 23),
                TlvSpec::int1("user_response_code", tags::USER_RESPONSE_CODE),
                TlvSpec::int1("display_time", tags::DISPLAY_TIME),
                TlvSpec::int2("sms_signal", tags::SMS_SIGNAL),
                TlvSpec::int1("ms_validity", tags::MS_VALIDITY),
                TlvSpec::int1("ms_msg_wait_facilities", tags::MS_MSG_WAIT_FACILITIES),
                TlvSpec::int1("number_of_messages", tags::NUMBER_OF_MESSAGES),
                TlvSpec::int1(
                    "alert_on_message_delivery",
                    tags::ALERT_ON_MESSAGE_DELIVERY,
                ),
                TlvSpec::int1("language_indicator", tags::LANGUAGE_INDICATOR),
                TlvSpec::int1("its_reply_type", tags::ITS_REPLY_TYPE),
                TlvSpec::int2("its_session_info", tags::ITS_SESSION_INFO),
            ]
        };

        let submit_multi_optional = || {
            vec![
                TlvSpec::int2("user_message_reference", tags::USER_MESSAGE_REFERENCE),
                TlvSpec::int2("source_port", tags::SOURCE_PORT),
                TlvSpec::int1("source_addr_subunit", tags::SOURCE_ADDR_SUBUNIT),
                TlvSpec::int2("destination_port", tags::DESTINATION_PORT),
                TlvSpec::int1("dest_addr_subunit", tags::DEST_ADDR_SUBUNIT),
                TlvSpec::int2("sar_msg_ref_num", tags::SAR_MSG_REF_NUM),
                TlvSpec::int1("sar_total_segments", tags::SAR_TOTAL_SEGMENTS),
                TlvSpec::int1("sar_segment_seqnum", tags::SAR_SEGMENT_SEQNUM),
                TlvSpec::int1("more_messages_to_send", tags::MORE_MESSAGES_TO_SEND),
                TlvSpec::int1("payload_type", tags::PAYLOAD_TYPE),
                TlvSpec::octets("message_payload", tags::MESSAGE_PAYLOAD, 65535),
                TlvSpec::int1("privacy_indicator", tags::PRIVACY_INDICATOR),
                TlvSpec::octets("callback_num", tags::CALLBACK_NUM, 19),
                TlvSpec::int1("callback_num_pres_ind", tags::CALLBACK_NUM_PRES_IND),
                TlvSpec::cstring("callback_num_atag", tags::CALLBACK_NUM_ATAG, 65),
                TlvSpec::octets("source_subaddress", tags::SOURCE_SUBADDRESS, 23),
                TlvSpec::octets("dest_subaddress", tags::DEST_SUBADDRESS, 23),
                TlvSpec::int1("user_response_code", tags::USER_RESPONSE_CODE),
                TlvSpec::int1("display_time", tags::DISPLAY_TIME),
                TlvSpec::int2("sms_signal", tags::SMS_SIGNAL),
                TlvSpec::int1("ms_validity", tags::MS_VALIDITY),
                TlvSpec::int1("ms_msg_wait_facilities", tags::MS_MSG_WAIT_FACILITIES),
                TlvSpec::int1(
                    "alert_on_message_delivery",
                    tags::ALERT_ON_MESSAGE_DELIVERY,
                ),
                TlvSpec::int1("language_indicator", tags::LANGUAGE_INDICATOR),
            ]
        };

        let mut commands = HashMap::new();
        let mut insert = |spec: CommandSpec| {
            commands.insert(spec.id, spec);
        };

        insert(CommandSpec::new(
            CommandId::BindTransmitter,
            bind_mandatory(),
            Vec::new(),
        ));
        insert(CommandSpec::new(
            CommandId::BindTransmitterResp,
            bind_resp_mandatory(),
            bind_resp_optional(),
        ));
        insert(CommandSpec::new(
            CommandId::BindReceiver,
            bind_mandatory(),
            Vec::new(),
        ));
        insert(CommandSpec::new(
            CommandId::BindReceiverResp,
            bind_resp_mandatory(),
            bind_resp_optional(),
        ));
        insert(CommandSpec::new(
            CommandId::BindTransceiver,
            bind_mandatory(),
            Vec::new(),
        ));
        insert(CommandSpec::new(
            CommandId::BindTransceiverResp,
            bind_resp_mandatory(),
            bind_resp_optional(),
        ));

        insert(CommandSpec::new(
            CommandId::Outbind,
            vec![
                ParamSpec::cstring("system_id", 16),
                ParamSpec::cstring("password", 9),
            ],
            Vec::new(),
        ));

        insert(CommandSpec::new(
            CommandId::SubmitSm,
            sm_mandatory(),
            submit_sm_optional(),
        ));
        insert(CommandSpec::new(
            CommandId::SubmitSmResp,
            vec![ParamSpec::cstring("message_id", 65)],
            Vec::new(),
        ));

        insert(CommandSpec::new(
            CommandId::DeliverSm,
            sm_mandatory(),
            deliver_sm_optional(),
        ));
        insert(CommandSpec::new(
            CommandId::DeliverSmResp,
            vec![ParamSpec::cstring("message_id", 65)],
            Vec::new(),
        ));

        insert(CommandSpec::new(
            CommandId::DataSm,
            vec![
                ParamSpec::cstring("service_type", 6),
                ParamSpec::int1("source_addr_ton"),
                ParamSpec::int1("source_addr_npi"),
                ParamSpec::cstring("source_addr", 21),
                ParamSpec::int1("dest_addr_ton"),
                ParamSpec::int1("dest_addr_npi"),
                ParamSpec::cstring("destination_addr", 21),
                ParamSpec::int1("esm_class"),
                ParamSpec::int1("registered_delivery"),
                ParamSpec::int1("data_coding"),
            ],
            data_sm_optional(),
        ));
        insert(CommandSpec::new(
            CommandId::DataSmResp,
            vec![ParamSpec::cstring("message_id", 65)],
            vec![
                TlvSpec::int1("delivery_failure_reason", tags::DELIVERY_FAILURE_REASON),
                TlvSpec::fixed("network_error_code", tags::NETWORK_ERROR_CODE, 3),
                TlvSpec::cstring(
                    "additional_status_info_text",
                    tags::ADDITIONAL_STATUS_INFO_TEXT,
                    256,
                ),
                TlvSpec::int1("dpf_result", tags::DPF_RESULT),
            ],
        ));

        insert(CommandSpec::new(
            CommandId::QuerySm,
            vec![
                ParamSpec::cstring("message_id", 65),
                ParamSpec::int1("source_addr_ton"),
                ParamSpec::int1("source_addr_npi"),
                ParamSpec::cstring("source_addr", 21),
            ],
            Vec::new(),
        ));
        insert(CommandSpec::new(
            CommandId::QuerySmResp,
            vec![
                ParamSpec::cstring("message_id", 65),
                ParamSpec::cstring("final_date", 17),
                // message_state doubles as a TLV elsewhere; here it is a
                // mandatory field
                ParamSpec::int1("message_state"),
                ParamSpec::int1("error_code"),
            ],
            Vec::new(),
        ));

        insert(CommandSpec::new(
            CommandId::ReplaceSm,
            vec![
                ParamSpec::cstring("message_id", 65),
                ParamSpec::int1("source_addr_ton"),
                ParamSpec::int1("source_addr_npi"),
                ParamSpec::cstring("source_addr", 21),
                ParamSpec::cstring("schedule_delivery_time", 17),
                ParamSpec::cstring("validity_period", 17),
                ParamSpec::int1("registered_delivery"),
                ParamSpec::int1("sm_default_msg_id"),
                ParamSpec::int1("sm_length"),
                ParamSpec::octets("short_message", 254, "sm_length"),
            ],
            Vec::new(),
        ));
        insert(CommandSpec::new(
            CommandId::ReplaceSmResp,
            Vec::new(),
            Vec::new(),
        ));

        insert(CommandSpec::new(
            CommandId::CancelSm,
            vec![
                ParamSpec::cstring("service_type", 6),
                ParamSpec::cstring("message_id", 65),
                ParamSpec::int1("source_addr_ton"),
                ParamSpec::int1("source_addr_npi"),
                ParamSpec::cstring("source_addr", 21),
                ParamSpec::int1("dest_addr_ton"),
                ParamSpec::int1("dest_addr_npi"),
                ParamSpec::cstring("destination_addr", 21),
            ],
            Vec::new(),
        ));
        insert(CommandSpec::new(
            CommandId::CancelSmResp,
            Vec::new(),
            Vec::new(),
        ));

        insert(CommandSpec::new(
            CommandId::SubmitMulti,
            vec![
                ParamSpec::cstring("service_type", 6),
                ParamSpec::int1("source_addr_ton"),
                ParamSpec::int1("source_addr_npi"),
                ParamSpec::cstring("source_addr", 21),
                ParamSpec::int1("number_of_dests"),
                ParamSpec::list("dest_address", ParamType::DestAddresses, "number_of_dests"),
                ParamSpec::int1("esm_class"),
                ParamSpec::int1("protocol_id"),
                ParamSpec::int1("priority_flag"),
                ParamSpec::cstring("schedule_delivery_time", 17),
                ParamSpec::cstring("validity_period", 17),
                ParamSpec::int1("registered_delivery"),
                ParamSpec::int1("replace_if_present_flag"),
                ParamSpec::int1("data_coding"),
                ParamSpec::int1("sm_default_msg_id"),
                ParamSpec::int1("sm_length"),
                ParamSpec::octets("short_message", 254, "sm_length"),
            ],
            submit_multi_optional(),
        ));
        insert(CommandSpec::new(
            CommandId::SubmitMultiResp,
            vec![
                ParamSpec::cstring("message_id", 65),
                ParamSpec::int1("no_unsuccess"),
                ParamSpec::list("unsuccess_sme", ParamType::UnsuccessSmes, "no_unsuccess"),
            ],
            Vec::new(),
        ));

        insert(CommandSpec::new(
            CommandId::AlertNotification,
            vec![
                ParamSpec::int1("source_addr_ton"),
                ParamSpec::int1("source_addr_npi"),
                ParamSpec::cstring("source_addr", 21),
                ParamSpec::int1("esme_addr_ton"),
                ParamSpec::int1("esme_addr_npi"),
                ParamSpec::cstring("esme_addr", 21),
            ],
            vec![TlvSpec::int1(
                "ms_availability_status",
                tags::MS_AVAILABILITY_STATUS,
            )],
        ));

        for id in [
            CommandId::Unbind,
            CommandId::UnbindResp,
            CommandId::EnquireLink,
            CommandId::EnquireLinkResp,
            CommandId::GenericNack,
        ] {
            insert(CommandSpec::new(id, Vec::new(), Vec::new()));
        }

        Registry { commands }
    }
}

static REGISTRY: LazyLock<RwLock<Registry>> =
    LazyLock::new(|| RwLock::new(Registry::standard()));

/// Run `f` against the schema of `id` under the registry read lock.
pub(crate) fn with_command_spec<R>(id: CommandId, f: impl FnOnce(&CommandSpec) -> R) -> R {
    let registry = REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f(registry.command(id))
}

/// Define a custom optional parameter (TLV) for one command type.
///
/// Once defined, the parameter is read and written by name like any standard
/// TLV, and incoming frames carrying the tag decode it instead of retaining it
/// as an unknown. A parameter used by several commands must be defined once
/// per command.
///
/// Definitions are process-wide and permanent. Repeating an identical
/// definition is a no-op; redefining an existing tag or name differently
/// fails. Vendor tags should live in the reserved 0x4000-0xFFFF range so they
/// cannot collide with SMPP 3.4 assignments.
///
/// ```
/// use smpp_esme::{define_optional_param, CommandId, ParamType};
///
/// define_optional_param(
///     CommandId::DataSm,
///     0x1501,
///     "billing_group",
///     ParamType::FixedOctetString { size: 2 },
/// )
/// .unwrap();
/// ```
pub fn define_optional_param(
    command: CommandId,
    tag: u16,
    name: &str,
    ty: ParamType,
) -> Result<(), RegistrationError> {
    let mut registry = REGISTRY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let spec = registry
        .commands
        .get_mut(&command)
        .unwrap_or_else(|| unreachable!("every command id has a schema"));

    if let Some(existing) = spec.optional.iter().find(|t| t.tag == tag) {
        if existing.name == name && existing.ty == ty {
            return Ok(());
        }
        return Err(RegistrationError::TagInUse {
            command,
            tag,
            existing: existing.name.clone(),
        });
    }
    if spec.tlv_by_name(name).is_some() || spec.mandatory_by_name(name).is_some() {
        return Err(RegistrationError::NameInUse {
            command,
            name: name.to_string(),
        });
    }

    spec.optional.push(TlvSpec::new(name, tag, ty));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_has_a_schema() {
        for id in [
            CommandId::GenericNack,
            CommandId::BindReceiver,
            CommandId::BindReceiverResp,
            CommandId::BindTransmitter,
            CommandId::BindTransmitterResp,
            CommandId::QuerySm,
            CommandId::QuerySmResp,
            CommandId::SubmitSm,
            CommandId::SubmitSmResp,
            CommandId::DeliverSm,
            CommandId::DeliverSmResp,
            CommandId::Unbind,
            CommandId::UnbindResp,
            CommandId::ReplaceSm,
            CommandId::ReplaceSmResp,
            CommandId::CancelSm,
            CommandId::CancelSmResp,
            CommandId::BindTransceiver,
            CommandId::BindTransceiverResp,
            CommandId::Outbind,
            CommandId::EnquireLink,
            CommandId::EnquireLinkResp,
            CommandId::SubmitMulti,
            CommandId::SubmitMultiResp,
            CommandId::AlertNotification,
            CommandId::DataSm,
            CommandId::DataSmResp,
        ] {
            with_command_spec(id, |spec| assert_eq!(spec.id, id));
        }
    }

    #[test]
    fn submit_sm_declares_short_message_length_coupling() {
        with_command_spec(CommandId::SubmitSm, |spec| {
            let short_message = spec.mandatory_by_name("short_message").unwrap();
            assert_eq!(short_message.len_param, Some("sm_length"));
            assert!(spec.tlv_by_tag(tags::MESSAGE_PAYLOAD).is_some());
        });
    }

    #[test]
    fn vendor_definition_is_idempotent_but_conflicts_fail() {
        let ty = ParamType::FixedOctetString { size: 2 };
        define_optional_param(CommandId::CancelSmResp, 0x4101, "vendor_a", ty).unwrap();
        // identical redefinition is accepted
        define_optional_param(CommandId::CancelSmResp, 0x4101, "vendor_a", ty).unwrap();
        // same tag, different name
        assert_eq!(
            define_optional_param(CommandId::CancelSmResp, 0x4101, "vendor_b", ty),
            Err(RegistrationError::TagInUse {
                command: CommandId::CancelSmResp,
                tag: 0x4101,
                existing: "vendor_a".to_string(),
            })
        );
        // same name, different tag
        assert_eq!(
            define_optional_param(CommandId::CancelSmResp, 0x4102, "vendor_a", ty),
            Err(RegistrationError::NameInUse {
                command: CommandId::CancelSmResp,
                name: "vendor_a".to_string(),
            })
        );
    }

    #[test]
    fn vendor_name_may_not_shadow_a_mandatory_param() {
        assert!(matches!(
            define_optional_param(
                CommandId::QuerySm,
                0x4103,
                "message_id",
                ParamType::Integer { size: 1 }
            ),
            Err(RegistrationError::NameInUse { .. })
        ));
    }
}
