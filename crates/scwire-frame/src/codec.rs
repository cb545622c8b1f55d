use bytes::{BufMut, Bytes, BytesMut};

use crate::codes::CommandCode;
use crate::error::{FrameError, Result};

/// Frame header: 1 + 1 + 4 + 4 = 10 bytes, in both directions.
pub const HEADER_SIZE: usize = 10;

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Byte offset of the payload/result length in either header.
pub(crate) const LENGTH_OFFSET: usize = 6;

/// Encode a command frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬──────────┬──────────────┬──────────────┬────────────────┐
/// │ Cmd (1B) │ Flags    │ Request id   │ Length       │ Payload        │
/// │          │ (1B)     │ (4B LE) = 0  │ (4B LE)      │ (Length bytes) │
/// └──────────┴──────────┴──────────────┴──────────────┴────────────────┘
/// ```
pub fn encode_command(
    code: CommandCode,
    flags: u8,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u8(code.as_u8());
    dst.put_u8(flags);
    dst.put_u32_le(0);
    dst.put_u32_le(payload.len() as u32);
    dst.put_slice(payload);
    Ok(())
}

/// Split one complete result frame off the front of a stream buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, the returned bytes hold the header and exactly the declared
/// number of payload bytes.
pub fn decode_result(src: &mut BytesMut, max_payload: usize) -> Result<Option<Bytes>> {
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    let declared = read_u32_le(src, LENGTH_OFFSET) as usize;
    if declared > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: declared,
            max: max_payload,
        });
    }

    let total = HEADER_SIZE + declared;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None); // Need more data
    }

    Ok(Some(src.split_to(total).freeze()))
}

pub(crate) fn read_u32_le(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_bytes(code: u8, result: u8, payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_u8(code);
        buf.put_u32_le(0);
        buf.put_u8(result);
        buf.put_u32_le(payload.len() as u32);
        buf.put_slice(payload);
        buf
    }

    #[test]
    fn encode_header_layout() {
        let mut buf = BytesMut::new();
        encode_command(CommandCode::CheckElement, 0, &[0xAA, 0xBB], &mut buf).unwrap();

        assert_eq!(
            buf.as_ref(),
            &[0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0xAA, 0xBB]
        );
    }

    #[test]
    fn encode_empty_payload() {
        let mut buf = BytesMut::new();
        encode_command(CommandCode::EventEmit, 0x80, b"", &mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);
        assert_eq!(buf[0], 0x10);
        assert_eq!(buf[1], 0x80);
        assert_eq!(&buf[6..10], &[0, 0, 0, 0]);
    }

    #[test]
    fn decode_incomplete_header() {
        let mut buf = BytesMut::from(&[0xa0, 0x00, 0x00][..]);
        assert!(decode_result(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap().is_none());
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn decode_incomplete_payload() {
        let mut buf = result_bytes(0xa0, 0, &[1, 2, 3, 4]);
        buf.truncate(HEADER_SIZE + 2);
        assert!(decode_result(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap().is_none());
    }

    #[test]
    fn decode_payload_too_large() {
        let mut buf = BytesMut::new();
        buf.put_u8(0x10);
        buf.put_u32_le(0);
        buf.put_u8(0);
        buf.put_u32_le(1024 * 1024 * 32);

        let result = decode_result(&mut buf, DEFAULT_MAX_PAYLOAD);
        assert!(matches!(result, Err(FrameError::PayloadTooLarge { .. })));
    }

    #[test]
    fn decode_consecutive_results() {
        let mut buf = result_bytes(0xa0, 0, &[2, 0, 1, 0]);
        buf.extend_from_slice(&result_bytes(0x10, 1, b""));

        let first = decode_result(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap().unwrap();
        assert_eq!(first.len(), HEADER_SIZE + 4);
        assert_eq!(first[0], 0xa0);

        let second = decode_result(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap().unwrap();
        assert_eq!(second.len(), HEADER_SIZE);
        assert_eq!(second[5], 1);
        assert!(buf.is_empty());
    }
}
