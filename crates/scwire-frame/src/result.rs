use bytes::Bytes;

use crate::addr::ElementAddress;
use crate::codec::{read_u32_le, HEADER_SIZE, LENGTH_OFFSET};
use crate::codes::{CommandCode, ResultCode};
use crate::error::{FrameError, Result};

/// Decoded header of an inbound result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultHeader {
    pub code: CommandCode,
    pub request_id: u32,
    pub result_code: ResultCode,
    pub result_length: u32,
}

/// Read-only view over one received server → client frame.
///
/// Layout (little-endian): command code at byte 0, request id at 1..5,
/// result code at 5, result length at 6..10, payload from 10.
/// Cloning shares the underlying buffer; nothing is copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFrame {
    bytes: Bytes,
}

impl ResultFrame {
    /// Wrap a received buffer. Fails only if it is shorter than a header;
    /// call [`ResultFrame::validate`] to check the declared length.
    pub fn new(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() < HEADER_SIZE {
            return Err(FrameError::Truncated { len: bytes.len() });
        }
        Ok(Self { bytes })
    }

    /// Check that the declared result length equals the payload actually received.
    pub fn validate(&self) -> Result<()> {
        let declared = self.result_length() as usize;
        let actual = self.bytes.len() - HEADER_SIZE;
        if declared != actual {
            return Err(FrameError::LengthMismatch { declared, actual });
        }
        Ok(())
    }

    pub fn header(&self) -> ResultHeader {
        ResultHeader {
            code: self.command_code(),
            request_id: self.request_id(),
            result_code: self.result_code(),
            result_length: self.result_length(),
        }
    }

    pub fn command_code(&self) -> CommandCode {
        CommandCode::from_u8(self.bytes[0])
    }

    pub fn request_id(&self) -> u32 {
        read_u32_le(&self.bytes, 1)
    }

    pub fn result_code(&self) -> ResultCode {
        ResultCode::from_u8(self.bytes[5])
    }

    pub fn result_length(&self) -> u32 {
        read_u32_le(&self.bytes, LENGTH_OFFSET)
    }

    pub fn header_size(&self) -> usize {
        HEADER_SIZE
    }

    /// Result payload (everything after the header).
    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_SIZE..]
    }

    /// Result payload as a shared buffer.
    pub fn payload_bytes(&self) -> Bytes {
        self.bytes.slice(HEADER_SIZE..)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn payload_u8(&self, offset: usize) -> Result<u8> {
        Ok(self.payload_slice(offset, 1)?[0])
    }

    pub fn payload_u16(&self, offset: usize) -> Result<u16> {
        let b = self.payload_slice(offset, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn payload_u32(&self, offset: usize) -> Result<u32> {
        let b = self.payload_slice(offset, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn payload_addr(&self, offset: usize) -> Result<ElementAddress> {
        self.payload_u32(offset).map(ElementAddress::from_raw)
    }

    fn payload_slice(&self, offset: usize, width: usize) -> Result<&[u8]> {
        let payload = self.payload();
        offset
            .checked_add(width)
            .and_then(|end| payload.get(offset..end))
            .ok_or(FrameError::PayloadOutOfBounds {
                offset,
                width,
                len: payload.len(),
            })
    }
}
