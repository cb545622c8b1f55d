use std::time::Duration;

use scwire_frame::{CommandCode, ResultCode};

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] scwire_transport::TransportError),

    /// Local frame or identifier error (building a command, reading a payload).
    #[error("frame error: {0}")]
    Frame(#[from] scwire_frame::FrameError),

    /// A received result frame was malformed. The connection cannot be
    /// resynchronized after this.
    #[error("framing error: {0}")]
    Framing(scwire_frame::FrameError),

    /// The server answered with a non-OK result code.
    #[error("{command} failed: {code}")]
    Protocol {
        command: CommandCode,
        code: ResultCode,
    },

    /// No result arrived within the configured bound.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The connection is gone or the client was shut down.
    #[error("disconnected: {0}")]
    Disconnected(String),

    /// The command is part of the protocol but not supported by this client.
    #[error("{0} is not supported")]
    Unsupported(CommandCode),
}

impl ClientError {
    /// Result code carried by a protocol failure, if any.
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            ClientError::Protocol { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
