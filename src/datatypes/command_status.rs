use num_enum::TryFromPrimitive;

/// SMPP v3.4 command_status values (Section 5.1.3)
///
/// The command_status field of a response PDU indicates the success or failure
/// of the request it answers. Requests carry 0 (`Ok`). Values outside this set
/// (the vendor-reserved 0x0400-0x04FF range among others) travel through the
/// library as raw `u32`s; this enum covers the codes the specification names.
#[derive(TryFromPrimitive)]
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandStatus {
    /// No error (ESME_ROK)
    Ok = 0x0000_0000,
    /// Message length is invalid
    InvalidMsgLength = 0x0000_0001,
    /// Command length is invalid
    InvalidCommandLength = 0x0000_0002,
    /// Invalid command id
    InvalidCommandId = 0x0000_0003,
    /// Incorrect BIND status for the given command
    IncorrectBindStatus = 0x0000_0004,
    /// ESME already in bound state
    AlreadyBound = 0x0000_0005,
    /// Invalid priority flag
    InvalidPriorityFlag = 0x0000_0006,
    /// Invalid registered delivery flag
    InvalidRegisteredDeliveryFlag = 0x0000_0007,
    /// System error
    SystemError = 0x0000_0008,
    /// Invalid source address
    InvalidSourceAddress = 0x0000_000A,
    /// Invalid destination address
    InvalidDestinationAddress = 0x0000_000B,
    /// Invalid message id
    InvalidMessageId = 0x0000_000C,
    /// Bind failed
    BindFailed = 0x0000_000D,
    /// Invalid password
    InvalidPassword = 0x0000_000E,
    /// Invalid system id
    InvalidSystemId = 0x0000_000F,
    /// cancel_sm failed
    CancelSmFailed = 0x0000_0011,
    /// replace_sm failed
    ReplaceSmFailed = 0x0000_0013,
    /// Message queue full
    MessageQueueFull = 0x0000_0014,
    /// Invalid service type
    InvalidServiceType = 0x0000_0015,
    /// Invalid number of destinations
    InvalidNumberOfDestinations = 0x0000_0033,
    /// Invalid distribution list name
    InvalidDistributionListName = 0x0000_0034,
    /// Invalid destination flag (submit_multi)
    InvalidDestinationFlag = 0x0000_0040,
    /// Invalid submit-with-replace request
    InvalidSubmitWithReplace = 0x0000_0042,
    /// Invalid esm_class field data
    InvalidEsmClass = 0x0000_0043,
    /// Cannot submit to distribution list
    CannotSubmitToDistributionList = 0x0000_0044,
    /// submit_sm or submit_multi failed
    SubmitFailed = 0x0000_0045,
    /// Invalid source address TON
    InvalidSourceTon = 0x0000_0048,
    /// Invalid source address NPI
    InvalidSourceNpi = 0x0000_0049,
    /// Invalid destination address TON
    InvalidDestinationTon = 0x0000_0050,
    /// Invalid destination address NPI
    InvalidDestinationNpi = 0x0000_0051,
    /// Invalid system_type field
    InvalidSystemType = 0x0000_0053,
    /// Invalid replace_if_present flag
    InvalidReplaceIfPresentFlag = 0x0000_0054,
    /// Invalid number of messages
    InvalidNumberOfMessages = 0x0000_0055,
    /// Throttling error: ESME has exceeded allowed message limits
    Throttled = 0x0000_0058,
    /// Invalid scheduled delivery time
    InvalidScheduledDeliveryTime = 0x0000_0061,
    /// Invalid message validity period (expiry time)
    InvalidExpiryTime = 0x0000_0062,
    /// Predefined message is invalid or not found
    InvalidPredefinedMessage = 0x0000_0063,
    /// ESME receiver temporary app error code
    ReceiverTemporaryError = 0x0000_0064,
    /// ESME receiver permanent app error code
    ReceiverPermanentError = 0x0000_0065,
    /// ESME receiver reject message error code
    ReceiverRejectMessage = 0x0000_0066,
    /// query_sm request failed
    QuerySmFailed = 0x0000_0067,
    /// Error in the optional part of the PDU body
    InvalidOptionalPartStream = 0x0000_00C0,
    /// Optional parameter not allowed
    OptionalParameterNotAllowed = 0x0000_00C1,
    /// Invalid parameter length
    InvalidParameterLength = 0x0000_00C2,
    /// Expected optional parameter missing
    MissingOptionalParameter = 0x0000_00C3,
    /// Invalid optional parameter value
    InvalidOptionalParameterValue = 0x0000_00C4,
    /// Delivery failure (used for data_sm_resp)
    DeliveryFailure = 0x0000_00FE,
    /// Unknown error
    UnknownError = 0x0000_00FF,
}

impl CommandStatus {
    /// Raw status value as carried in the PDU header.
    pub fn value(self) -> u32 {
        self as u32
    }

    /// Short specification description for a raw status value; `None` for
    /// codes outside the standard set.
    pub fn describe(status: u32) -> Option<&'static str> {
        let status = CommandStatus::try_from(status).ok()?;
        Some(match status {
            CommandStatus::Ok => "No error",
            CommandStatus::InvalidMsgLength => "Message length is invalid",
            CommandStatus::InvalidCommandLength => "Command length is invalid",
            CommandStatus::InvalidCommandId => "Invalid command id",
            CommandStatus::IncorrectBindStatus => "Incorrect BIND status for given command",
            CommandStatus::AlreadyBound => "ESME already in bound state",
            CommandStatus::InvalidPriorityFlag => "Invalid priority flag",
            CommandStatus::InvalidRegisteredDeliveryFlag => "Invalid registered delivery flag",
            CommandStatus::SystemError => "System error",
            CommandStatus::InvalidSourceAddress => "Invalid source address",
            CommandStatus::InvalidDestinationAddress => "Invalid destination address",
            CommandStatus::InvalidMessageId => "Invalid message id",
            CommandStatus::BindFailed => "Bind failed",
            CommandStatus::InvalidPassword => "Invalid password",
            CommandStatus::InvalidSystemId => "Invalid system id",
            CommandStatus::CancelSmFailed => "cancel_sm failed",
            CommandStatus::ReplaceSmFailed => "replace_sm failed",
            CommandStatus::MessageQueueFull => "Message queue full",
            CommandStatus::InvalidServiceType => "Invalid service type",
            CommandStatus::InvalidNumberOfDestinations => "Invalid number of destinations",
            CommandStatus::InvalidDistributionListName => "Invalid distribution list name",
            CommandStatus::InvalidDestinationFlag => "Invalid destination flag",
            CommandStatus::InvalidSubmitWithReplace => "Invalid submit-with-replace request",
            CommandStatus::InvalidEsmClass => "Invalid esm_class field data",
            CommandStatus::CannotSubmitToDistributionList => "Cannot submit to distribution list",
            CommandStatus::SubmitFailed => "Submit failed",
            CommandStatus::InvalidSourceTon => "Invalid source address TON",
            CommandStatus::InvalidSourceNpi => "Invalid source address NPI",
            CommandStatus::InvalidDestinationTon => "Invalid destination address TON",
            CommandStatus::InvalidDestinationNpi => "Invalid destination address NPI",
            CommandStatus::InvalidSystemType => "Invalid system_type field",
            CommandStatus::InvalidReplaceIfPresentFlag => "Invalid replace_if_present flag",
            CommandStatus::InvalidNumberOfMessages => "Invalid number of messages",
            CommandStatus::Throttled => "Throttling error",
            CommandStatus::InvalidScheduledDeliveryTime => "Invalid scheduled delivery time",
            CommandStatus::InvalidExpiryTime => "Invalid message validity period",
            CommandStatus::InvalidPredefinedMessage => "Predefined message invalid or not found",
            CommandStatus::ReceiverTemporaryError => "ESME receiver temporary app error",
            CommandStatus::ReceiverPermanentError => "ESME receiver permanent app error",
            CommandStatus::ReceiverRejectMessage => "ESME receiver reject message error",
            CommandStatus::QuerySmFailed => "query_sm request failed",
            CommandStatus::InvalidOptionalPartStream => "Error in the optional part of the body",
            CommandStatus::OptionalParameterNotAllowed => "Optional parameter not allowed",
            CommandStatus::InvalidParameterLength => "Invalid parameter length",
            CommandStatus::MissingOptionalParameter => "Expected optional parameter missing",
            CommandStatus::InvalidOptionalParameterValue => "Invalid optional parameter value",
            CommandStatus::DeliveryFailure => "Delivery failure",
            CommandStatus::UnknownError => "Unknown error",
        })
    }
}
