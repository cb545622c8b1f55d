//! Fixed-header framing for the scwire graph protocol.
//!
//! Every message in either direction carries a 10-byte little-endian header
//! followed by a variable-length payload:
//! - Commands: code (1), flags (1), request id (4), payload length (4)
//! - Results: code (1), request id (4), result code (1), result length (4)
//!
//! The two directions share byte offsets but are modelled as distinct types
//! ([`CommandFrame`] and [`ResultFrame`]) so their fields cannot be confused.

pub mod addr;
#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod codes;
pub mod command;
pub mod error;
pub mod reader;
pub mod result;
pub mod writer;

pub use addr::{address_from_identifier, identifier_from_address, ElementAddress};
#[cfg(feature = "async")]
pub use async_codec::ScCodec;
pub use codec::{decode_result, encode_command, FrameConfig, DEFAULT_MAX_PAYLOAD, HEADER_SIZE};
pub use codes::{CommandCode, EventType, IteratorType, ResultCode};
pub use command::{CommandBuilder, CommandFrame, CommandHeader};
pub use error::{FrameError, Result};
pub use reader::ResultReader;
pub use result::{ResultFrame, ResultHeader};
pub use writer::CommandWriter;
