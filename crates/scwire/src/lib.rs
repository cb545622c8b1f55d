//! Client driver for the scwire graph-store protocol.
//!
//! One [`client::ScClient`] holds one connection to the store, runs every
//! command through a strict one-in-flight pipeline and fans queued server
//! events out to subscription callbacks.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP and Unix domain socket streams, endpoint parsing
//! - [`frame`]: 10-byte command/result headers, element addresses
//! - [`client`]: pipeline, event registry and drain loop, the client object

/// Re-export transport types.
pub mod transport {
    pub use scwire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use scwire_frame::*;
}

/// Re-export client types.
pub mod client {
    pub use scwire_client::*;
}

pub use scwire_client::{connect, connect_with_config, ClientConfig, ClientError, ScClient};
pub use scwire_frame::{address_from_identifier, identifier_from_address, ElementAddress};
