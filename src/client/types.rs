// ABOUTME: Supporting types for the session engine: session states, bind
// ABOUTME: credentials, sequence generation, callbacks and configuration

use std::collections::HashMap;
use std::time::Duration;

use crate::datatypes::{CommandId, DataCoding};
use crate::pdu::Pdu;

/// Session states of an ESME, per SMPP v3.4 Section 2.1.
///
/// ```text
/// Closed -> Unbound -> BoundTx / BoundRx / BoundTrx -> Unbinding -> Closed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No TCP connection exists.
    Closed,
    /// Connected, no bind completed (the specification's OPEN).
    Unbound,
    /// Bound as transmitter.
    BoundTx,
    /// Bound as receiver.
    BoundRx,
    /// Bound as transceiver.
    BoundTrx,
    /// Unbind sent, waiting for unbind_resp.
    Unbinding,
}

impl SessionState {
    pub fn is_bound(self) -> bool {
        matches!(
            self,
            SessionState::BoundTx | SessionState::BoundRx | SessionState::BoundTrx
        )
    }

    /// Whether an ESME in this state may issue `command`, per the session
    /// state table of SMPP v3.4 Section 2.3.
    pub(crate) fn allows(self, command: CommandId) -> bool {
        use CommandId::*;
        match command {
            BindTransmitter | BindReceiver | BindTransceiver => self == SessionState::Unbound,
            SubmitSm | SubmitMulti | QuerySm | CancelSm | ReplaceSm | DataSm => {
                matches!(self, SessionState::BoundTx | SessionState::BoundTrx)
            }
            DeliverSmResp => matches!(self, SessionState::BoundRx | SessionState::BoundTrx),
            Unbind => self.is_bound(),
            UnbindResp | EnquireLink | EnquireLinkResp | GenericNack => {
                self.is_bound() || self == SessionState::Unbinding
            }
            _ => self.is_bound(),
        }
    }
}

/// Maximum sequence number; the generator wraps back to 1 past this.
pub const MAX_SEQUENCE: u32 = 0x7FFF_FFFF;

/// Strategy for allocating outgoing sequence numbers.
///
/// Implementations own their state; the default is a plain counter with no
/// persistence. Supply your own to survive restarts.
pub trait SequenceGenerator: Send {
    fn next_sequence(&mut self) -> u32;
}

/// In-memory counter: post-increment from 0, wrapping to 1 after
/// [`MAX_SEQUENCE`]. The first allocation returns 1; 0 is never produced.
#[derive(Debug, Default)]
pub struct CounterSequence {
    current: u32,
}

impl CounterSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently allocated sequence number.
    pub fn current(&self) -> u32 {
        self.current
    }
}

impl SequenceGenerator for CounterSequence {
    fn next_sequence(&mut self) -> u32 {
        self.current = if self.current >= MAX_SEQUENCE {
            1
        } else {
            self.current + 1
        };
        self.current
    }
}

/// Authentication material for the bind operations.
#[derive(Clone, Debug)]
pub struct BindCredentials {
    pub system_id: String,
    pub password: String,
    /// Overrides the client-level system_type when set.
    pub system_type: Option<String>,
    pub addr_ton: u8,
    pub addr_npi: u8,
    pub address_range: String,
}

impl BindCredentials {
    pub fn new(system_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            system_id: system_id.into(),
            password: password.into(),
            system_type: None,
            addr_ton: 0,
            addr_npi: 0,
            address_range: String::new(),
        }
    }

    pub fn with_system_type(mut self, system_type: impl Into<String>) -> Self {
        self.system_type = Some(system_type.into());
        self
    }

    pub fn with_address_range(mut self, ton: u8, npi: u8, range: impl Into<String>) -> Self {
        self.addr_ton = ton;
        self.addr_npi = npi;
        self.address_range = range.into();
        self
    }
}

/// A PDU callback. Runs synchronously on the task that sent or received the
/// PDU. The returned status, if any, replaces ESME_ROK in the automatic
/// response to an incoming request; it is ignored for all other PDUs.
pub type PduCallback = Box<dyn FnMut(&Pdu) -> Option<u32> + Send>;

/// Callback table: one optional handler per command id plus a wildcard
/// invoked for commands without a dedicated handler.
#[derive(Default)]
pub struct Callbacks {
    by_command: HashMap<CommandId, PduCallback>,
    all_commands: Option<PduCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a handler for one command id.
    pub fn on(
        mut self,
        command: CommandId,
        callback: impl FnMut(&Pdu) -> Option<u32> + Send + 'static,
    ) -> Self {
        self.by_command.insert(command, Box::new(callback));
        self
    }

    /// Install the wildcard handler.
    pub fn on_all(mut self, callback: impl FnMut(&Pdu) -> Option<u32> + Send + 'static) -> Self {
        self.all_commands = Some(Box::new(callback));
        self
    }

    pub(crate) fn dispatch(&mut self, pdu: &Pdu) -> Option<u32> {
        if let Some(callback) = self.by_command.get_mut(&pdu.command_id()) {
            return callback(pdu);
        }
        if let Some(callback) = self.all_commands.as_mut() {
            return callback(pdu);
        }
        None
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("commands", &self.by_command.keys().collect::<Vec<_>>())
            .field("wildcard", &self.all_commands.is_some())
            .finish()
    }
}

/// Session engine configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Default system_type for bind operations.
    pub system_type: String,
    /// interface_version sent on bind; 0x34 for SMPP 3.4.
    pub interface_version: u8,
    /// When set, `read_one_pdu` probes an idle link with an enquire_link
    /// after this long without traffic instead of blocking forever.
    pub enquire_link_interval: Option<Duration>,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            system_type: String::new(),
            interface_version: 0x34,
            enquire_link_interval: None,
        }
    }

    pub fn with_system_type(mut self, system_type: impl Into<String>) -> Self {
        self.system_type = system_type.into();
        self
    }

    pub fn with_interface_version(mut self, version: u8) -> Self {
        self.interface_version = version;
        self
    }

    pub fn with_enquire_link_interval(mut self, interval: Duration) -> Self {
        self.enquire_link_interval = Some(interval);
        self
    }
}

/// A text message with addressing, ready for [`crate::client::Client::submit_message`].
///
/// Encoding selection, multipart splitting and UDH generation happen in the
/// short message layer; this type only carries what the caller knows.
#[derive(Clone, Debug)]
pub struct SmsMessage {
    /// Destination address (destination_addr).
    pub to: String,
    /// Source address (source_addr).
    pub from: String,
    pub text: String,
    /// Requested coding; the effective one may differ after UCS-2 fallback.
    pub data_coding: DataCoding,
    /// registered_delivery flags; 1 requests a delivery receipt.
    pub registered_delivery: u8,
}

impl SmsMessage {
    pub fn new(to: impl Into<String>, from: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            from: from.into(),
            text: text.into(),
            data_coding: DataCoding::Default,
            registered_delivery: 0,
        }
    }

    pub fn with_data_coding(mut self, coding: DataCoding) -> Self {
        self.data_coding = coding;
        self
    }

    pub fn with_delivery_receipt(mut self) -> Self {
        self.registered_delivery = 1;
        self
    }
}
