use std::io::{ErrorKind, Write};

use scwire_transport::ScStream;
use tracing::trace;

use crate::codec::{FrameConfig, HEADER_SIZE};
use crate::command::CommandFrame;
use crate::error::{FrameError, Result};
use crate::reader::transport_to_frame_error;

/// Writes complete command frames to any `Write` stream.
pub struct CommandWriter<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Write> CommandWriter<T> {
    /// Create a new command writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new command writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Write a complete command frame (blocking).
    pub fn write_command(&mut self, frame: &CommandFrame) -> Result<()> {
        self.write_raw(frame.as_bytes())
    }

    /// Write already-encoded frame bytes (blocking).
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        let payload = bytes.len().saturating_sub(HEADER_SIZE);
        if payload > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload,
                max: self.config.max_payload_size,
            });
        }

        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        trace!(len = bytes.len(), "command frame written");

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current command writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl CommandWriter<ScStream> {
    /// Create a command writer for `ScStream` and apply write timeout from config.
    pub fn with_config_stream(inner: ScStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}
