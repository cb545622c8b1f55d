use std::time::{Duration, Instant};

use bytes::Bytes;
use scwire_frame::{CommandWriter, FrameConfig, FrameError, ResultReader};
use scwire_transport::ScStream;
use tracing::debug;

/// Message-level duplex link to the graph store.
///
/// Each `recv` yields exactly one result frame's bytes. The pipeline calls
/// `send` and `recv` strictly alternately.
pub trait Connection: Send {
    /// Transmit one complete command frame.
    fn send(&mut self, frame: &[u8]) -> scwire_frame::Result<()>;

    /// Block until the next result frame arrives.
    fn recv(&mut self) -> scwire_frame::Result<Bytes>;

    /// Bound how long one `recv` may take in total. `None` blocks
    /// indefinitely.
    fn set_recv_timeout(&mut self, _timeout: Option<Duration>) -> scwire_frame::Result<()> {
        Ok(())
    }

    /// Release the underlying link. Called once when the pipeline stops.
    fn close(&mut self) {}
}

/// [`Connection`] over a connected [`ScStream`].
pub struct StreamConnection {
    reader: ResultReader<ScStream>,
    writer: CommandWriter<ScStream>,
    recv_timeout: Option<Duration>,
}

impl StreamConnection {
    pub fn new(stream: ScStream, config: FrameConfig) -> scwire_frame::Result<Self> {
        let reader_stream = stream.try_clone().map_err(transport_io)?;
        let reader = ResultReader::with_config_stream(reader_stream, config.clone())?;
        let writer = CommandWriter::with_config_stream(stream, config)?;
        Ok(Self {
            reader,
            writer,
            recv_timeout: None,
        })
    }
}

impl Connection for StreamConnection {
    fn send(&mut self, frame: &[u8]) -> scwire_frame::Result<()> {
        self.writer.write_raw(frame)
    }

    fn recv(&mut self) -> scwire_frame::Result<Bytes> {
        let frame = match self.recv_timeout {
            Some(timeout) => self.reader.read_result_before(Instant::now() + timeout)?,
            None => self.reader.read_result()?,
        };
        Ok(frame.into_bytes())
    }

    fn set_recv_timeout(&mut self, timeout: Option<Duration>) -> scwire_frame::Result<()> {
        self.recv_timeout = timeout;
        self.reader
            .get_ref()
            .set_read_timeout(timeout)
            .map_err(transport_io)
    }

    fn close(&mut self) {
        if let Err(err) = self.writer.get_ref().shutdown() {
            debug!(%err, "stream shutdown failed");
        }
    }
}

fn transport_io(err: scwire_transport::TransportError) -> FrameError {
    match err {
        scwire_transport::TransportError::Io(io) => FrameError::Io(io),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
