use bytes::{BufMut, Bytes, BytesMut};

use crate::addr::ElementAddress;
use crate::codec::{encode_command, read_u32_le, HEADER_SIZE, LENGTH_OFFSET};
use crate::codes::CommandCode;
use crate::error::{FrameError, Result};

/// Decoded header of an outbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandHeader {
    pub code: CommandCode,
    pub flags: u8,
    /// Always 0 in this protocol generation; results are matched by arrival order.
    pub request_id: u32,
    pub payload_length: u32,
}

/// A complete, encoded client → server frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    header: CommandHeader,
    bytes: Bytes,
}

impl CommandFrame {
    /// Encode a command with a pre-built payload.
    pub fn new(code: CommandCode, flags: u8, payload: &[u8]) -> Result<Self> {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
        encode_command(code, flags, payload, &mut buf)?;
        Ok(Self {
            header: CommandHeader {
                code,
                flags,
                request_id: 0,
                payload_length: payload.len() as u32,
            },
            bytes: buf.freeze(),
        })
    }

    /// A command with no payload.
    pub fn empty(code: CommandCode) -> Self {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE);
        put_header(&mut buf, code, 0, 0);
        Self {
            header: CommandHeader {
                code,
                flags: 0,
                request_id: 0,
                payload_length: 0,
            },
            bytes: buf.freeze(),
        }
    }

    pub fn header(&self) -> &CommandHeader {
        &self.header
    }

    pub fn code(&self) -> CommandCode {
        self.header.code
    }

    /// Payload bytes after the header.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_SIZE..]
    }

    /// Complete wire bytes (header + payload).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        self.bytes.len()
    }
}

/// Incremental command assembler.
///
/// The write cursor starts right after the header; [`CommandBuilder::finish`]
/// patches the payload length once the payload is complete.
#[derive(Debug)]
pub struct CommandBuilder {
    code: CommandCode,
    flags: u8,
    buf: BytesMut,
}

impl CommandBuilder {
    pub fn new(code: CommandCode) -> Self {
        Self::with_flags(code, 0)
    }

    pub fn with_flags(code: CommandCode, flags: u8) -> Self {
        Self::with_capacity(code, flags, 0)
    }

    /// Pre-size the buffer for `payload_capacity` payload bytes.
    pub fn with_capacity(code: CommandCode, flags: u8, payload_capacity: usize) -> Self {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload_capacity);
        put_header(&mut buf, code, flags, 0);
        Self { code, flags, buf }
    }

    pub fn put_u8(&mut self, v: u8) -> &mut Self {
        self.buf.put_u8(v);
        self
    }

    pub fn put_u32(&mut self, v: u32) -> &mut Self {
        self.buf.put_u32_le(v);
        self
    }

    pub fn put_addr(&mut self, addr: ElementAddress) -> &mut Self {
        self.put_u32(addr.raw())
    }

    pub fn put_slice(&mut self, data: &[u8]) -> &mut Self {
        self.buf.put_slice(data);
        self
    }

    /// Append `u32 byte length` followed by the raw bytes.
    pub fn put_bytes_with_len(&mut self, data: &[u8]) -> Result<&mut Self> {
        let len = u32::try_from(data.len()).map_err(|_| FrameError::PayloadTooLarge {
            size: data.len(),
            max: u32::MAX as usize,
        })?;
        self.put_u32(len);
        Ok(self.put_slice(data))
    }

    /// Append a length-prefixed UTF-8 string.
    pub fn put_str_with_len(&mut self, text: &str) -> Result<&mut Self> {
        self.put_bytes_with_len(text.as_bytes())
    }

    /// Bytes written after the header so far.
    pub fn payload_len(&self) -> usize {
        self.buf.len() - HEADER_SIZE
    }

    /// Patch the payload length and produce the frame.
    pub fn finish(mut self) -> Result<CommandFrame> {
        let payload_len = self.payload_len();
        let payload_length = u32::try_from(payload_len).map_err(|_| FrameError::PayloadTooLarge {
            size: payload_len,
            max: u32::MAX as usize,
        })?;
        self.buf[LENGTH_OFFSET..HEADER_SIZE].copy_from_slice(&payload_length.to_le_bytes());
        debug_assert_eq!(read_u32_le(&self.buf, LENGTH_OFFSET), payload_length);

        Ok(CommandFrame {
            header: CommandHeader {
                code: self.code,
                flags: self.flags,
                request_id: 0,
                payload_length,
            },
            bytes: self.buf.freeze(),
        })
    }
}

fn put_header(buf: &mut BytesMut, code: CommandCode, flags: u8, payload_length: u32) {
    buf.put_u8(code.as_u8());
    buf.put_u8(flags);
    buf.put_u32_le(0);
    buf.put_u32_le(payload_length);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_layout() {
        let frame = CommandFrame::new(CommandCode::CheckElement, 0, &[0xAA, 0xBB]).unwrap();
        assert_eq!(
            frame.as_bytes(),
            &[0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0xAA, 0xBB]
        );
        assert_eq!(frame.wire_size(), HEADER_SIZE + 2);
        assert_eq!(frame.payload(), &[0xAA, 0xBB]);
        assert_eq!(frame.header().payload_length, 2);
        assert_eq!(frame.header().request_id, 0);
    }

    #[test]
    fn builder_patches_length() {
        let mut builder = CommandBuilder::with_flags(CommandCode::FindElementBySysIdtf, 0x01);
        builder.put_str_with_len("node_1").unwrap();
        assert_eq!(builder.payload_len(), 10);

        let frame = builder.finish().unwrap();
        let bytes = frame.as_bytes();
        assert_eq!(bytes[0], 0xa0);
        assert_eq!(bytes[1], 0x01);
        assert_eq!(&bytes[2..6], &[0, 0, 0, 0]);
        assert_eq!(&bytes[6..10], &10u32.to_le_bytes());
        assert_eq!(&bytes[10..14], &6u32.to_le_bytes());
        assert_eq!(&bytes[14..], b"node_1");
    }

    #[test]
    fn builder_matches_one_shot_encoding() {
        let mut builder = CommandBuilder::new(CommandCode::CreateArc);
        builder
            .put_u8(0x20)
            .put_addr(ElementAddress::new(1, 2))
            .put_u32(0xDEAD_BEEF)
            .put_slice(&[9, 9]);
        let built = builder.finish().unwrap();

        let mut payload = vec![0x20];
        payload.extend_from_slice(&0x0001_0002u32.to_le_bytes());
        payload.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        payload.extend_from_slice(&[9, 9]);
        let direct = CommandFrame::new(CommandCode::CreateArc, 0, &payload).unwrap();

        assert_eq!(built, direct);
    }

    #[test]
    fn empty_frame_is_header_only() {
        let frame = CommandFrame::empty(CommandCode::EventEmit);
        assert_eq!(frame.as_bytes(), &[0x10, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(frame.payload().is_empty());
        assert_eq!(frame.code(), CommandCode::EventEmit);
    }
}
