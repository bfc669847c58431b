//! An SMPP client ("ESME") session engine.
//!
//! The [`Client`] owns the TCP connection and covers the network transmission
//! side of the ESME role: it connects to an SMSC, performs a bind, transmits
//! ESME-issued commands and can sit in a loop waiting for incoming PDUs.
//!
//! ## Basic usage
//!
//! ```rust,no_run
//! use smpp_esme::{BindCredentials, Client, ClientConfig, CommandId, Pdu};
//!
//! # async fn example() -> smpp_esme::SmppResult<()> {
//! let mut esme = Client::new(ClientConfig::new("smsc.host.or.ip", 2776));
//! esme.connect().await?;
//! esme.bind_transmitter(&BindCredentials::new("username", "pass")).await?;
//!
//! let mut pdu = Pdu::new(CommandId::SubmitSm);
//! pdu.set_str("destination_addr", "4178481818")?;
//! pdu.set_bytes("short_message", &b"test sms"[..])?;
//! esme.submit_sm(pdu).await?;
//!
//! // the submit_sm_resp arrives on the next read
//! esme.read_one_pdu().await?;
//!
//! esme.unbind().await?;
//! esme.listen().await?; // exits once unbind_resp arrives
//! # Ok(())
//! # }
//! ```
//!
//! ## Callbacks
//!
//! Handlers registered per command id (plus one wildcard) run right after an
//! incoming PDU is parsed, or right before an outgoing PDU is written. For
//! incoming requests the handler's returned status replaces ESME_ROK in the
//! automatic response:
//!
//! ```rust,no_run
//! use smpp_esme::{Callbacks, Client, ClientConfig, CommandId};
//!
//! let mut esme = Client::new(ClientConfig::new("smsc.host.or.ip", 2776));
//! esme.set_callbacks(
//!     Callbacks::new()
//!         .on(CommandId::DeliverSm, |pdu| {
//!             println!("got a deliver_sm, sequence {}", pdu.sequence_number);
//!             None // answer with ESME_ROK
//!         })
//!         .on_all(|pdu| {
//!             tracing::debug!(command = pdu.command_name(), "PDU observed");
//!             None
//!         }),
//! );
//! ```
//!
//! ## Threading model
//!
//! All I/O suspends on `.await`; the engine itself takes `&mut self`
//! everywhere, so exactly one task drives a client at a time. The typical
//! pattern is one task calling [`Client::listen`] while the application holds
//! the client elsewhere only between awaits, or a single task interleaving
//! sends and reads. Cancellation is [`Client::disconnect`], which closes the
//! socket and fails any blocked read with a connection error.

pub mod error;
pub mod types;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

use crate::connection::Connection;
use crate::datatypes::CommandId;
use crate::pdu::Pdu;
use crate::sm::{self, SmContent};

pub use error::{SmppError, SmppResult};
pub use types::{
    BindCredentials, Callbacks, ClientConfig, CounterSequence, PduCallback, SequenceGenerator,
    SessionState, SmsMessage, MAX_SEQUENCE,
};

/// An SMPP client in the ESME role.
///
/// Generic over the byte stream so sessions can run over anything duplex;
/// [`Client::new`] + [`Client::connect`] give the ordinary TCP form.
pub struct Client<S = TcpStream> {
    config: ClientConfig,
    state: SessionState,
    connection: Option<Connection<S>>,
    sequence: Box<dyn SequenceGenerator>,
    callbacks: Callbacks,
}

impl Client<TcpStream> {
    /// Create an unconnected client. The session starts `Closed`; call
    /// [`Client::connect`].
    pub fn new(config: ClientConfig) -> Self {
        Client {
            config,
            state: SessionState::Closed,
            connection: None,
            sequence: Box::new(CounterSequence::new()),
            callbacks: Callbacks::new(),
        }
    }

    /// Open the TCP connection to the configured SMSC.
    pub async fn connect(&mut self) -> SmppResult<()> {
        if self.state != SessionState::Closed {
            return Err(SmppError::InvalidState {
                command: "connect",
                state: self.state,
            });
        }
        info!(
            host = self.config.host.as_str(),
            port = self.config.port,
            "connecting to SMSC"
        );
        let stream = TcpStream::connect((self.config.host.as_str(), self.config.port)).await?;
        self.connection = Some(Connection::new(stream));
        self.state = SessionState::Unbound;
        Ok(())
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Client<S> {
    /// Wrap an already-connected duplex stream. The session starts `Unbound`.
    ///
    /// This is how sessions run over substrates other than plain TCP, and how
    /// the test suite drives the engine over in-memory pipes.
    pub fn from_stream(stream: S, config: ClientConfig) -> Self {
        Client {
            config,
            state: SessionState::Unbound,
            connection: Some(Connection::new(stream)),
            sequence: Box::new(CounterSequence::new()),
            callbacks: Callbacks::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Replace the callback table.
    pub fn set_callbacks(&mut self, callbacks: Callbacks) {
        self.callbacks = callbacks;
    }

    /// Replace the sequence allocation strategy.
    pub fn set_sequence_generator(&mut self, generator: impl SequenceGenerator + 'static) {
        self.sequence = Box::new(generator);
    }

    /// Close the socket and mark the session `Closed`.
    ///
    /// Safe to call in any state and idempotent. This is the blunt exit: a
    /// clean shutdown sends [`Client::unbind`] first and lets the read loop
    /// finish on the unbind_resp.
    pub async fn disconnect(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            if let Err(error) = connection.shutdown().await {
                debug!(%error, "socket shutdown failed");
            }
            info!("disconnected from SMSC");
        }
        self.state = SessionState::Closed;
    }

    /// Bind as a transmitter. Blocks until the bind response arrives.
    pub async fn bind_transmitter(&mut self, credentials: &BindCredentials) -> SmppResult<Pdu> {
        self.bind(CommandId::BindTransmitter, credentials).await
    }

    /// Bind as a receiver. Blocks until the bind response arrives.
    pub async fn bind_receiver(&mut self, credentials: &BindCredentials) -> SmppResult<Pdu> {
        self.bind(CommandId::BindReceiver, credentials).await
    }

    /// Bind as a transceiver. Blocks until the bind response arrives.
    pub async fn bind_transceiver(&mut self, credentials: &BindCredentials) -> SmppResult<Pdu> {
        self.bind(CommandId::BindTransceiver, credentials).await
    }

    async fn bind(
        &mut self,
        command: CommandId,
        credentials: &BindCredentials,
    ) -> SmppResult<Pdu> {
        let (response_id, bound_state) = match command {
            CommandId::BindTransmitter => (CommandId::BindTransmitterResp, SessionState::BoundTx),
            CommandId::BindReceiver => (CommandId::BindReceiverResp, SessionState::BoundRx),
            _ => (CommandId::BindTransceiverResp, SessionState::BoundTrx),
        };
        debug!(command = command.name(), "binding");

        let mut pdu = Pdu::new(command);
        pdu.set_str("system_id", credentials.system_id.as_str())?;
        pdu.set_str("password", credentials.password.as_str())?;
        let system_type = credentials
            .system_type
            .as_deref()
            .unwrap_or(self.config.system_type.as_str());
        pdu.set_str("system_type", system_type)?;
        pdu.set_int("interface_version", self.config.interface_version as u32)?;
        pdu.set_int("addr_ton", credentials.addr_ton as u32)?;
        pdu.set_int("addr_npi", credentials.addr_npi as u32)?;
        pdu.set_str("address_range", credentials.address_range.as_str())?;
        let sequence = self.write_pdu(pdu, true).await?;

        let response = match self.read_frame_closing().await? {
            Some(response) => response,
            None => {
                self.disconnect().await;
                return Err(SmppError::ConnectionClosed);
            }
        };
        self.callbacks.dispatch(&response);

        if response.command_id() != response_id {
            return Err(SmppError::UnexpectedPdu {
                expected: response_id.name(),
                actual: response.command_name(),
            });
        }
        if response.sequence_number != sequence {
            warn!(
                expected = sequence,
                actual = response.sequence_number,
                "bind response sequence does not match the request"
            );
        }
        if !response.ok() {
            return Err(SmppError::Command {
                command: response.command_name(),
                status: response.command_status,
                sequence_number: response.sequence_number,
            });
        }
        self.state = bound_state;
        info!(
            state = ?self.state,
            system_id = response.str_value("system_id").unwrap_or(""),
            "bound"
        );
        Ok(response)
    }

    /// Send a submit_sm. Returns the sequence number used.
    pub async fn submit_sm(&mut self, pdu: Pdu) -> SmppResult<u32> {
        self.send_command(CommandId::SubmitSm, pdu).await
    }

    /// Send a submit_multi. Returns the sequence number used.
    pub async fn submit_multi(&mut self, pdu: Pdu) -> SmppResult<u32> {
        self.send_command(CommandId::SubmitMulti, pdu).await
    }

    /// Send a data_sm. Returns the sequence number used.
    pub async fn data_sm(&mut self, pdu: Pdu) -> SmppResult<u32> {
        self.send_command(CommandId::DataSm, pdu).await
    }

    /// Send a query_sm. Returns the sequence number used.
    pub async fn query_sm(&mut self, pdu: Pdu) -> SmppResult<u32> {
        self.send_command(CommandId::QuerySm, pdu).await
    }

    /// Send a cancel_sm. Returns the sequence number used.
    pub async fn cancel_sm(&mut self, pdu: Pdu) -> SmppResult<u32> {
        self.send_command(CommandId::CancelSm, pdu).await
    }

    /// Send a replace_sm. Returns the sequence number used.
    pub async fn replace_sm(&mut self, pdu: Pdu) -> SmppResult<u32> {
        self.send_command(CommandId::ReplaceSm, pdu).await
    }

    /// Probe the link with an enquire_link. The response arrives through the
    /// read loop like any other PDU.
    pub async fn enquire_link(&mut self) -> SmppResult<u32> {
        self.send_pdu(Pdu::new(CommandId::EnquireLink)).await
    }

    /// Send an unbind and mark the session `Unbinding`. The socket stays open;
    /// the read loop exits once the unbind_resp arrives.
    pub async fn unbind(&mut self) -> SmppResult<u32> {
        let sequence = self.send_pdu(Pdu::new(CommandId::Unbind)).await?;
        self.state = SessionState::Unbinding;
        Ok(sequence)
    }

    /// Encode, split and submit a text message, one submit_sm per part.
    /// Returns the sequence numbers used, in part order.
    pub async fn submit_message(&mut self, message: &SmsMessage) -> SmppResult<Vec<u32>> {
        let split =
            sm::split_short_message(SmContent::Text(message.text.as_str()), message.data_coding)?;
        let mut sequences = Vec::with_capacity(split.parts.len());
        for part in &split.parts {
            let mut pdu = Pdu::new(CommandId::SubmitSm);
            pdu.set_str("source_addr", message.from.as_str())?;
            pdu.set_str("destination_addr", message.to.as_str())?;
            pdu.set_int("esm_class", split.esm_class as u32)?;
            pdu.set_int("data_coding", split.data_coding.to_byte() as u32)?;
            pdu.set_int("registered_delivery", message.registered_delivery as u32)?;
            pdu.set_bytes("short_message", part.clone())?;
            sequences.push(self.send_pdu(pdu).await?);
        }
        Ok(sequences)
    }

    /// Send any prepared PDU, assigning a sequence number when the caller
    /// left it at 0. Returns the sequence number used.
    ///
    /// The session state must permit the PDU's command per the SMPP role
    /// rules; the per-command methods are thin wrappers over this.
    pub async fn send_pdu(&mut self, pdu: Pdu) -> SmppResult<u32> {
        self.write_pdu(pdu, true).await
    }

    async fn send_command(&mut self, expected: CommandId, pdu: Pdu) -> SmppResult<u32> {
        if pdu.command_id() != expected {
            return Err(SmppError::UnexpectedPdu {
                expected: expected.name(),
                actual: pdu.command_name(),
            });
        }
        self.write_pdu(pdu, true).await
    }

    async fn write_pdu(&mut self, mut pdu: Pdu, assign_sequence: bool) -> SmppResult<u32> {
        if !self.state.allows(pdu.command_id()) {
            return Err(SmppError::InvalidState {
                command: pdu.command_name(),
                state: self.state,
            });
        }
        if assign_sequence && pdu.sequence_number == 0 {
            pdu.sequence_number = self.sequence.next_sequence();
        }
        let sequence = pdu.sequence_number;

        // "about to send" callback; its return value only matters for
        // auto-responses, which set their status before reaching here
        self.callbacks.dispatch(&pdu);

        let connection = self.connection.as_mut().ok_or(SmppError::InvalidState {
            command: pdu.command_name(),
            state: SessionState::Closed,
        })?;
        let result = connection.write_frame(&mut pdu).await;
        match result {
            Ok(()) => Ok(sequence),
            Err(error) => {
                if matches!(
                    error,
                    SmppError::Connection(_) | SmppError::ConnectionClosed
                ) {
                    self.disconnect().await;
                }
                Err(error)
            }
        }
    }

    /// One framed read; returns `Ok(None)` on clean peer close. Connection
    /// failures close the session before propagating.
    async fn read_frame_closing(&mut self) -> SmppResult<Option<Pdu>> {
        let connection = self.connection.as_mut().ok_or(SmppError::InvalidState {
            command: "read",
            state: SessionState::Closed,
        })?;
        let result = connection.read_frame().await;
        if let Err(error) = &result {
            if matches!(
                error,
                SmppError::Connection(_) | SmppError::ConnectionClosed
            ) {
                self.disconnect().await;
            }
        }
        result
    }

    /// Read and process one incoming PDU.
    ///
    /// Parses the frame, lets bind/unbind responses drive the state machine,
    /// invokes the command's callback (or the wildcard) and answers incoming
    /// requests automatically, using the callback's returned status or
    /// ESME_ROK. Returns `false` after UNBIND or UNBIND_RESP, in which case
    /// the session has been disconnected; `true` means keep reading.
    ///
    /// When `enquire_link_interval` is configured an idle link is probed with
    /// an enquire_link instead of blocking indefinitely.
    pub async fn read_one_pdu(&mut self) -> SmppResult<bool> {
        let read = match self.config.enquire_link_interval {
            Some(interval) => {
                let connection = self.connection.as_mut().ok_or(SmppError::InvalidState {
                    command: "read_one_pdu",
                    state: SessionState::Closed,
                })?;
                match tokio::time::timeout(interval, connection.read_frame()).await {
                    Ok(read) => read,
                    Err(_elapsed) => {
                        debug!("link idle past the enquire_link interval, probing");
                        self.send_pdu(Pdu::new(CommandId::EnquireLink)).await?;
                        return Ok(true);
                    }
                }
            }
            None => {
                let connection = self.connection.as_mut().ok_or(SmppError::InvalidState {
                    command: "read_one_pdu",
                    state: SessionState::Closed,
                })?;
                connection.read_frame().await
            }
        };

        let pdu = match read {
            Ok(Some(pdu)) => pdu,
            Ok(None) => {
                self.disconnect().await;
                return Err(SmppError::ConnectionClosed);
            }
            Err(error) => {
                if matches!(
                    error,
                    SmppError::Connection(_) | SmppError::ConnectionClosed
                ) {
                    self.disconnect().await;
                }
                return Err(error);
            }
        };

        debug!(
            command = pdu.command_name(),
            sequence = pdu.sequence_number,
            "received PDU"
        );
        if !pdu.ok() {
            warn!(
                command = pdu.command_name(),
                status = format_args!("{:#010x}", pdu.command_status),
                "received PDU with a non-OK status"
            );
        }

        // successful bind responses observed here (e.g. from a custom read
        // loop) advance the state machine just as Client::bind does
        if pdu.ok() {
            match pdu.command_id() {
                CommandId::BindTransmitterResp => self.state = SessionState::BoundTx,
                CommandId::BindReceiverResp => self.state = SessionState::BoundRx,
                CommandId::BindTransceiverResp => self.state = SessionState::BoundTrx,
                _ => {}
            }
        }

        let callback_status = self.callbacks.dispatch(&pdu);

        match pdu.command_id() {
            CommandId::Unbind => {
                let mut response = Pdu::new(CommandId::UnbindResp);
                response.sequence_number = pdu.sequence_number;
                response.command_status = callback_status.unwrap_or(0);
                self.write_pdu(response, false).await?;
                debug!("answered unbind, closing session");
                self.disconnect().await;
                return Ok(false);
            }
            CommandId::UnbindResp => {
                debug!("unbind_resp received, closing session");
                self.disconnect().await;
                return Ok(false);
            }
            id if !id.is_response() => {
                if let Some(response_id) = id.response_pair() {
                    let mut response = Pdu::new(response_id);
                    response.sequence_number = pdu.sequence_number;
                    response.command_status = callback_status.unwrap_or(0);
                    self.write_pdu(response, false).await?;
                    trace!(command = response_id.name(), "auto-response written");
                }
            }
            _ => {}
        }
        Ok(true)
    }

    /// Block reading incoming PDUs until the session ends.
    ///
    /// Loops on [`Client::read_one_pdu`] until it returns `false` (UNBIND or
    /// UNBIND_RESP received, session disconnected) or an error propagates.
    /// After an error the socket is only closed for connection failures; a
    /// caller that handles a decode or command error may resume listening.
    pub async fn listen(&mut self) -> SmppResult<()> {
        while self.read_one_pdu().await? {
            trace!("waiting for PDU");
        }
        Ok(())
    }
}
