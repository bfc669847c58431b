// ABOUTME: Session engine error types covering the caller-discriminable
// ABOUTME: failure categories: encode, decode, command, connection and state

use std::io;

use thiserror::Error;

use crate::client::types::SessionState;
use crate::codec::{DecodeError, EncodeError};
use crate::datatypes::CommandStatus;

/// Errors surfaced by the session engine.
///
/// The engine recovers nothing on its own: every failure propagates so the
/// caller's outer loop can decide whether to log, retry or reconnect.
#[derive(Debug, Error)]
pub enum SmppError {
    /// Socket open, read or write failed. The session is closed.
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    /// The peer closed the stream.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// A PDU value could not be serialized. Raised before any bytes hit the
    /// socket.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Incoming bytes were malformed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The short message layer could not encode or split the text.
    #[error(transparent)]
    ShortMessage(#[from] crate::sm::SmError),

    /// A response carried a non-zero command_status.
    #[error("{command} rejected with status {status:#010x} (sequence {sequence_number})")]
    Command {
        command: &'static str,
        status: u32,
        sequence_number: u32,
    },

    /// A method was invoked in a session state that forbids it. Nothing was
    /// sent.
    #[error("{command} is not legal in session state {state:?}")]
    InvalidState {
        command: &'static str,
        state: SessionState,
    },

    /// The peer answered with a different PDU than the protocol calls for.
    #[error("expected {expected}, received {actual}")]
    UnexpectedPdu {
        expected: &'static str,
        actual: &'static str,
    },
}

impl SmppError {
    /// The SMPP status code carried by a `Command` error, when it maps to a
    /// standard `CommandStatus`.
    pub fn command_status(&self) -> Option<CommandStatus> {
        match self {
            SmppError::Command { status, .. } => CommandStatus::try_from(*status).ok(),
            _ => None,
        }
    }
}

pub type SmppResult<T> = Result<T, SmppError>;
