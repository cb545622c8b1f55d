/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Fewer bytes than a full header were received.
    #[error("frame truncated ({len} bytes, header needs {})", crate::codec::HEADER_SIZE)]
    Truncated { len: usize },

    /// The result header disagrees with the number of payload bytes received.
    #[error("result length mismatch (header declares {declared} bytes, received {actual})")]
    LengthMismatch { declared: usize, actual: usize },

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A typed payload read ran past the end of the payload.
    #[error("payload read out of bounds (offset {offset}, width {width}, payload {len} bytes)")]
    PayloadOutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },

    /// An element identifier did not have the `<segment>_<offset>` shape.
    #[error("malformed element identifier: {0:?}")]
    MalformedIdentifier(String),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

impl FrameError {
    /// True for I/O errors caused by an expired read or write timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            FrameError::Io(err)
                if matches!(err.kind(), std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock)
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
