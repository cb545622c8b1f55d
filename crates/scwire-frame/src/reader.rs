use std::io::{ErrorKind, Read};
use std::time::Instant;

use bytes::BytesMut;
use scwire_transport::ScStream;
use tracing::trace;

use crate::codec::{decode_result, FrameConfig};
use crate::error::{FrameError, Result};
use crate::result::ResultFrame;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete result frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete frames.
pub struct ResultReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> ResultReader<T> {
    /// Create a new result reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new result reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete result frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_result(&mut self) -> Result<ResultFrame> {
        self.read_result_with(|_| Ok(()))
    }

    /// `before_read` runs ahead of every blocking read on the inner stream.
    fn read_result_with<F>(&mut self, mut before_read: F) -> Result<ResultFrame>
    where
        F: FnMut(&T) -> Result<()>,
    {
        loop {
            if let Some(bytes) = decode_result(&mut self.buf, self.config.max_payload_size)? {
                trace!(len = bytes.len(), "result frame received");
                return ResultFrame::new(bytes);
            }

            before_read(&self.inner)?;
            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Bytes received but not yet consumed as a complete frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current result reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl ResultReader<ScStream> {
    /// Create a result reader for `ScStream` and apply read timeout from config.
    pub fn with_config_stream(inner: ScStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }

    /// Read the next result frame, failing with a timed-out I/O error once
    /// `deadline` passes. The socket read timeout is narrowed to the time
    /// left before every read and stays at that value afterwards.
    pub fn read_result_before(&mut self, deadline: Instant) -> Result<ResultFrame> {
        self.read_result_with(|stream| {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Err(FrameError::Io(std::io::Error::new(
                    ErrorKind::TimedOut,
                    "result deadline passed",
                )));
            }
            stream
                .set_read_timeout(Some(left))
                .map_err(transport_to_frame_error)
        })
    }
}

pub(crate) fn transport_to_frame_error(err: scwire_transport::TransportError) -> FrameError {
    match err {
        scwire_transport::TransportError::Io(io) => FrameError::Io(io),
        scwire_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BufMut;

    use super::*;
    use crate::codes::{CommandCode, ResultCode};

    fn wire_result(code: u8, result: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        buf.put_u8(code);
        buf.put_u32_le(0);
        buf.put_u8(result);
        buf.put_u32_le(payload.len() as u32);
        buf.put_slice(payload);
        buf.to_vec()
    }

    #[test]
    fn read_single_result() {
        let wire = wire_result(0xa0, 0, &[2, 0, 1, 0]);
        let mut reader = ResultReader::new(Cursor::new(wire));
        let frame = reader.read_result().unwrap();

        frame.validate().unwrap();
        assert_eq!(frame.command_code(), CommandCode::FindElementBySysIdtf);
        assert_eq!(frame.result_code(), ResultCode::Ok);
        assert_eq!(frame.payload_u32(0).unwrap(), 0x0001_0002);
    }

    #[test]
    fn read_multiple_results() {
        let mut wire = wire_result(0x01, 0, b"");
        wire.extend(wire_result(0x02, 1, b"x"));
        wire.extend(wire_result(0x03, 2, b"yz"));

        let mut reader = ResultReader::new(Cursor::new(wire));
        let codes: Vec<_> = (0..3)
            .map(|_| reader.read_result().unwrap().result_code())
            .collect();
        assert_eq!(
            codes,
            vec![ResultCode::Ok, ResultCode::Fail, ResultCode::NoElement]
        );
        assert_eq!(reader.buffered(), 0);
    }

    #[test]
    fn partial_read_handling() {
        let wire = wire_result(0x10, 0, &[0, 0, 0, 0]);
        let mut reader = ResultReader::new(ByteByByteReader {
            bytes: wire,
            pos: 0,
        });

        let frame = reader.read_result().unwrap();
        assert_eq!(frame.command_code(), CommandCode::EventEmit);
        assert_eq!(frame.payload_u32(0).unwrap(), 0);
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = ResultReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_result().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let mut wire = wire_result(0xa0, 0, &[1, 2, 3, 4]);
        wire.truncate(12);

        let mut reader = ResultReader::new(Cursor::new(wire));
        let err = reader.read_result().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn oversized_result_in_stream() {
        let wire = wire_result(0x09, 0, &[0u8; 64]);
        let cfg = FrameConfig {
            max_payload_size: 16,
            ..FrameConfig::default()
        };
        let mut reader = ResultReader::with_config(Cursor::new(wire), cfg);
        let err = reader.read_result().unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 64, max: 16 }));
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            interrupted: false,
            inner: Cursor::new(wire_result(0x01, 0, b"ok")),
        };
        let mut framed = ResultReader::new(reader);
        let frame = framed.read_result().unwrap();
        assert_eq!(frame.payload(), b"ok");
    }

    #[test]
    fn timeout_surfaces_as_io_error() {
        let mut reader = ResultReader::new(AlwaysTimesOut);
        let err = reader.read_result().unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    #[cfg(unix)]
    fn applies_read_timeout_for_stream() {
        let (left, _right) = std::os::unix::net::UnixStream::pair().unwrap();
        let cfg = FrameConfig {
            read_timeout: Some(std::time::Duration::from_millis(10)),
            ..FrameConfig::default()
        };

        let mut reader = ResultReader::with_config_stream(ScStream::from_unix(left), cfg).unwrap();
        assert!(reader.read_result().unwrap_err().is_timeout());
    }

    #[test]
    #[cfg(unix)]
    fn deadline_bounds_a_trickling_peer() {
        use std::io::Write;
        use std::time::Duration;

        let (left, mut right) = std::os::unix::net::UnixStream::pair().unwrap();
        let writer = std::thread::spawn(move || {
            for byte in wire_result(0x01, 0, &[0u8; 16]) {
                std::thread::sleep(Duration::from_millis(30));
                if right.write_all(&[byte]).is_err() {
                    return;
                }
            }
        });

        let mut reader = ResultReader::new(ScStream::from_unix(left));
        let started = Instant::now();
        let err = reader
            .read_result_before(started + Duration::from_millis(100))
            .unwrap_err();
        assert!(err.is_timeout(), "{err}");
        assert!(started.elapsed() < Duration::from_millis(400));
        drop(reader);
        writer.join().unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn deadline_allows_a_prompt_reply() {
        use std::io::Write;
        use std::time::Duration;

        let (left, mut right) = std::os::unix::net::UnixStream::pair().unwrap();
        right.write_all(&wire_result(0x01, 0, b"ok")).unwrap();

        let mut reader = ResultReader::new(ScStream::from_unix(left));
        let frame = reader
            .read_result_before(Instant::now() + Duration::from_secs(5))
            .unwrap();
        assert_eq!(frame.payload(), b"ok");
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    struct AlwaysTimesOut;

    impl Read for AlwaysTimesOut {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::TimedOut))
        }
    }
}
