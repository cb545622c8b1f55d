use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_result, DEFAULT_MAX_PAYLOAD};
use crate::command::CommandFrame;
use crate::error::{FrameError, Result};
use crate::result::ResultFrame;

/// `tokio_util` codec: encodes [`CommandFrame`]s, decodes [`ResultFrame`]s.
#[derive(Debug, Clone)]
pub struct ScCodec {
    max_payload: usize,
}

impl ScCodec {
    pub fn new() -> Self {
        Self::with_max_payload(DEFAULT_MAX_PAYLOAD)
    }

    pub fn with_max_payload(max_payload: usize) -> Self {
        Self { max_payload }
    }
}

impl Default for ScCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ScCodec {
    type Item = ResultFrame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<ResultFrame>> {
        decode_result(src, self.max_payload)?
            .map(ResultFrame::new)
            .transpose()
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<ResultFrame>> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(FrameError::ConnectionClosed),
        }
    }
}

impl Encoder<CommandFrame> for ScCodec {
    type Error = FrameError;

    fn encode(&mut self, item: CommandFrame, dst: &mut BytesMut) -> Result<()> {
        let payload = item.payload().len();
        if payload > self.max_payload {
            return Err(FrameError::PayloadTooLarge {
                size: payload,
                max: self.max_payload,
            });
        }
        dst.extend_from_slice(item.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;
    use crate::codes::{CommandCode, ResultCode};

    fn wire_result(code: u8, result: u8, payload: &[u8]) -> Vec<u8> {
        let mut wire = vec![code, 0, 0, 0, 0, result];
        wire.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        wire.extend_from_slice(payload);
        wire
    }

    #[tokio::test]
    async fn framed_read_yields_results() {
        let mut wire = wire_result(0xa0, 0, &[2, 0, 1, 0]);
        wire.extend(wire_result(0xa0, 2, b""));

        let mut framed = FramedRead::new(wire.as_slice(), ScCodec::new());
        let first = framed.next().await.unwrap().unwrap();
        assert_eq!(first.payload_addr(0).unwrap().raw(), 0x0001_0002);
        let second = framed.next().await.unwrap().unwrap();
        assert_eq!(second.result_code(), ResultCode::NoElement);
        assert!(framed.next().await.is_none());
    }

    #[tokio::test]
    async fn framed_read_reports_truncated_tail() {
        let mut wire = wire_result(0x10, 0, &[0, 0, 0, 0]);
        wire.truncate(12);

        let mut framed = FramedRead::new(wire.as_slice(), ScCodec::new());
        let err = framed.next().await.unwrap().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[tokio::test]
    async fn framed_write_emits_wire_bytes() {
        let mut out = Vec::new();
        {
            let mut framed = FramedWrite::new(&mut out, ScCodec::new());
            framed
                .send(CommandFrame::new(CommandCode::CheckElement, 0, &[0xAA, 0xBB]).unwrap())
                .await
                .unwrap();
        }
        assert_eq!(out, [1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0xAA, 0xBB]);
    }

    #[test]
    fn encoder_enforces_payload_limit() {
        let mut codec = ScCodec::with_max_payload(1);
        let mut dst = BytesMut::new();
        let err = codec
            .encode(
                CommandFrame::new(CommandCode::SetLinkContent, 0, b"xy").unwrap(),
                &mut dst,
            )
            .unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
    }
}
