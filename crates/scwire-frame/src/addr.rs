//! Element addressing.
//!
//! An element address is a 32-bit value packing a 16-bit segment number in
//! the high half and a 16-bit offset within that segment in the low half.
//! Its external textual form is `"<segment>_<offset>"`.

use std::fmt;
use std::str::FromStr;

use crate::error::{FrameError, Result};

/// Size of an element address on the wire.
pub const ADDR_SIZE: usize = 4;

/// Packed `(segment << 16) | offset` address of a node, arc or link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementAddress(u32);

impl ElementAddress {
    /// Build an address from its segment and offset.
    pub const fn new(segment: u16, offset: u16) -> Self {
        Self(((segment as u32) << 16) | offset as u32)
    }

    /// Wrap a raw wire value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw wire value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn segment(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub const fn offset(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

impl From<u32> for ElementAddress {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<ElementAddress> for u32 {
    fn from(addr: ElementAddress) -> Self {
        addr.0
    }
}

impl fmt::Display for ElementAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.segment(), self.offset())
    }
}

impl FromStr for ElementAddress {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        address_from_identifier(s)
    }
}

/// Parse a `"<segment>_<offset>"` identifier.
///
/// Both parts must be decimal integers that fit in 16 bits.
pub fn address_from_identifier(text: &str) -> Result<ElementAddress> {
    let malformed = || FrameError::MalformedIdentifier(text.to_string());

    let mut parts = text.split('_');
    let (Some(segment), Some(offset), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };

    let segment: u16 = segment.parse().map_err(|_| malformed())?;
    let offset: u16 = offset.parse().map_err(|_| malformed())?;
    Ok(ElementAddress::new(segment, offset))
}

/// Format an address as its `"<segment>_<offset>"` identifier.
///
/// The segment is the high 16 bits, so raw `0x0001_0002` formats as `"1_2"`.
pub fn identifier_from_address(addr: ElementAddress) -> String {
    addr.to_string()
}
