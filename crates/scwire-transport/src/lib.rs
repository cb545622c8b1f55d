//! Duplex byte-stream transport for the scwire graph protocol.
//!
//! One client holds exactly one persistent connection to the graph store.
//! The connection is either:
//! - A TCP stream (remote stores)
//! - A Unix domain socket (co-located stores, Linux/macOS)
//!
//! This is the lowest layer of scwire. Everything else builds on top of
//! the [`ScStream`] type provided here.

pub mod endpoint;
pub mod error;
pub mod stream;

pub use endpoint::Endpoint;
pub use error::{Result, TransportError};
pub use stream::ScStream;
