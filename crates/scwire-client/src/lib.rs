//! Client side of the scwire graph protocol.
//!
//! An [`ScClient`] owns one connection to the graph store and serializes
//! every command onto it: at most one request is in flight, results settle
//! in submission order. A background drain loop polls the store for queued
//! events and fans them out to registered subscription callbacks.

pub mod client;
pub mod commands;
pub mod config;
pub mod connection;
pub mod connector;
pub mod error;
pub mod events;
pub mod handle;
pub mod pipeline;
pub mod store;

pub use client::ScClient;
pub use commands::FindResult;
pub use config::{ClientConfig, PipelineConfig, TimeoutPolicy};
pub use connection::{Connection, StreamConnection};
pub use connector::{connect, connect_with_config};
pub use error::{ClientError, Result};
pub use events::{EventCallback, EventPump, EventRecord, EventRegistry};
pub use handle::ResultHandle;
pub use pipeline::{Pipeline, Submitter};
pub use store::GraphStore;
