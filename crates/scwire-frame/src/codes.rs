//! Protocol code tables.
//!
//! Command codes 0x00-0x10 address graph elements; 0xa0-0xa2 are
//! identifier and server-level commands.

use std::fmt;

/// Command carried in byte 0 of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandCode {
    Unknown = 0x00,
    /// Check that an element exists.
    CheckElement = 0x01,
    GetElementType = 0x02,
    EraseElement = 0x03,
    CreateNode = 0x04,
    CreateLink = 0x05,
    CreateArc = 0x06,
    /// Return the begin and end elements of an arc.
    GetArc = 0x07,
    GetLinkContent = 0x09,
    /// Return links whose content matches.
    FindLinks = 0x0a,
    SetLinkContent = 0x0b,
    /// Run a template iteration.
    IterateElements = 0x0c,
    EventCreate = 0x0e,
    EventDestroy = 0x0f,
    /// Drain events queued on the server for this connection.
    EventEmit = 0x10,
    FindElementBySysIdtf = 0xa0,
    SetSysIdtf = 0xa1,
    Statistics = 0xa2,
}

impl CommandCode {
    /// Decode a wire byte; unassigned values map to [`CommandCode::Unknown`].
    pub fn from_u8(code: u8) -> Self {
        match code {
            0x01 => Self::CheckElement,
            0x02 => Self::GetElementType,
            0x03 => Self::EraseElement,
            0x04 => Self::CreateNode,
            0x05 => Self::CreateLink,
            0x06 => Self::CreateArc,
            0x07 => Self::GetArc,
            0x09 => Self::GetLinkContent,
            0x0a => Self::FindLinks,
            0x0b => Self::SetLinkContent,
            0x0c => Self::IterateElements,
            0x0e => Self::EventCreate,
            0x0f => Self::EventDestroy,
            0x10 => Self::EventEmit,
            0xa0 => Self::FindElementBySysIdtf,
            0xa1 => Self::SetSysIdtf,
            0xa2 => Self::Statistics,
            _ => Self::Unknown,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable command name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::CheckElement => "check-element",
            Self::GetElementType => "get-element-type",
            Self::EraseElement => "erase-element",
            Self::CreateNode => "create-node",
            Self::CreateLink => "create-link",
            Self::CreateArc => "create-arc",
            Self::GetArc => "get-arc",
            Self::GetLinkContent => "get-link-content",
            Self::FindLinks => "find-links",
            Self::SetLinkContent => "set-link-content",
            Self::IterateElements => "iterate-elements",
            Self::EventCreate => "event-create",
            Self::EventDestroy => "event-destroy",
            Self::EventEmit => "event-emit",
            Self::FindElementBySysIdtf => "find-element-by-sys-idtf",
            Self::SetSysIdtf => "set-sys-idtf",
            Self::Statistics => "statistics",
        }
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02x})", self.name(), self.as_u8())
    }
}

/// Outcome carried in byte 5 of a result frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Ok,
    Fail,
    /// The addressed element does not exist.
    NoElement,
    /// A code this client does not know; kept verbatim.
    Other(u8),
}

impl ResultCode {
    pub fn from_u8(code: u8) -> Self {
        match code {
            0x00 => Self::Ok,
            0x01 => Self::Fail,
            0x02 => Self::NoElement,
            other => Self::Other(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Ok => 0x00,
            Self::Fail => 0x01,
            Self::NoElement => 0x02,
            Self::Other(code) => code,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::Fail => f.write_str("fail"),
            Self::NoElement => f.write_str("no such element"),
            Self::Other(code) => write!(f, "unknown result code 0x{code:02x}"),
        }
    }
}

/// Template shapes accepted by the iterate-elements command.
///
/// `F` marks a fixed element, `A` an element to be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IteratorType {
    Iter3FAA = 0,
    Iter3AAF = 1,
    Iter3FAF = 2,
    Iter5FAAAF = 3,
    Iter5AAFAF = 4,
    Iter5FAFAF = 5,
    Iter5FAFAA = 6,
    Iter5FAAAA = 7,
    Iter5AAFAA = 8,
}

impl IteratorType {
    /// Number of fixed arguments the template expects.
    pub fn fixed_args(self) -> usize {
        match self {
            Self::Iter3FAA | Self::Iter3AAF | Self::Iter5FAAAA | Self::Iter5AAFAA => 1,
            Self::Iter3FAF | Self::Iter5FAAAF | Self::Iter5AAFAF | Self::Iter5FAFAA => 2,
            Self::Iter5FAFAF => 3,
        }
    }
}

/// Element changes a subscription can watch for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventType {
    AddOutputArc = 0,
    AddInputArc = 1,
    RemoveOutputArc = 2,
    RemoveInputArc = 3,
    RemoveElement = 4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_codes_match_wire_values() {
        assert_eq!(CommandCode::CheckElement.as_u8(), 0x01);
        assert_eq!(CommandCode::GetLinkContent.as_u8(), 0x09);
        assert_eq!(CommandCode::EventEmit.as_u8(), 0x10);
        assert_eq!(CommandCode::FindElementBySysIdtf.as_u8(), 0xa0);
        assert_eq!(CommandCode::Statistics.as_u8(), 0xa2);
    }

    #[test]
    fn command_code_decoding() {
        for code in 0u8..=0xff {
            let decoded = CommandCode::from_u8(code);
            if decoded != CommandCode::Unknown {
                assert_eq!(decoded.as_u8(), code);
            }
        }
        // Gaps in the table stay unknown.
        assert_eq!(CommandCode::from_u8(0x08), CommandCode::Unknown);
        assert_eq!(CommandCode::from_u8(0x0d), CommandCode::Unknown);
    }

    #[test]
    fn result_codes_preserve_unknown_values() {
        assert_eq!(ResultCode::from_u8(0), ResultCode::Ok);
        assert_eq!(ResultCode::from_u8(1), ResultCode::Fail);
        assert_eq!(ResultCode::from_u8(2), ResultCode::NoElement);
        assert_eq!(ResultCode::from_u8(0x7f), ResultCode::Other(0x7f));
        assert_eq!(ResultCode::Other(0x7f).as_u8(), 0x7f);
        assert!(ResultCode::Ok.is_ok());
        assert!(!ResultCode::NoElement.is_ok());
    }

    #[test]
    fn display_names() {
        assert_eq!(
            CommandCode::FindElementBySysIdtf.to_string(),
            "find-element-by-sys-idtf (0xa0)"
        );
        assert_eq!(ResultCode::NoElement.to_string(), "no such element");
    }

    #[test]
    fn iterator_fixed_argument_counts() {
        assert_eq!(IteratorType::Iter3FAA.fixed_args(), 1);
        assert_eq!(IteratorType::Iter3FAF.fixed_args(), 2);
        assert_eq!(IteratorType::Iter5FAFAF.fixed_args(), 3);
        assert_eq!(EventType::RemoveElement as u8, 4);
    }
}
