//! SMPP v3.4 client (ESME) library.
//!
//! Three layers compose, leaves first:
//!
//! * [`pdu`] with [`schema`] and [`codec`] - a schema-driven encoder/decoder
//!   for every SMPP 3.4 command, mandatory parameters in declared order plus
//!   optional TLVs, extensible with vendor tags via
//!   [`schema::define_optional_param`].
//! * [`sm`] - short message tooling: GSM 03.38 with its extension table,
//!   7-bit packing, UCS-2 fallback and multipart splitting with UDH
//!   concatenation headers.
//! * [`client`] - the session engine: connect, bind in one of the three ESME
//!   roles, send commands, and a read loop that dispatches callbacks and
//!   answers incoming requests automatically.
//!
//! ```rust,no_run
//! use smpp_esme::{BindCredentials, Client, ClientConfig, SmsMessage};
//!
//! #[tokio::main]
//! async fn main() -> smpp_esme::SmppResult<()> {
//!     let mut esme = Client::new(ClientConfig::new("localhost", 2775));
//!     esme.connect().await?;
//!     esme.bind_transceiver(&BindCredentials::new("system_id", "password")).await?;
//!
//!     // splitting, UDH generation and data_coding selection are automatic
//!     let message = SmsMessage::new("41787818181", "41767676767", "Hello SMPP world!");
//!     esme.submit_message(&message).await?;
//!
//!     esme.unbind().await?;
//!     esme.listen().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod connection;
pub mod datatypes;
pub mod pdu;
pub mod schema;
pub mod sm;


pub use client::{
    BindCredentials, Callbacks, Client, ClientConfig, CounterSequence, SequenceGenerator,
    SessionState, SmppError, SmppResult, SmsMessage, MAX_SEQUENCE,
};
pub use codec::{frame_length, DecodeError, EncodeError, MAX_PDU_SIZE};
pub use connection::Connection;
pub use datatypes::{tags, CommandId, CommandStatus, DataCoding, Tlv};
pub use pdu::{DestAddress, Pdu, UnsuccessSme, Value};
pub use schema::{define_optional_param, ParamType, RegistrationError};
pub use sm::{
    encode_short_message, pack_7bit, split_short_message, unpack_7bit, SmContent, SmError,
    SplitMessage,
};
