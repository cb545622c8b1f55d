//! Payload encodings for the commands this client speaks.

use scwire_frame::{CommandBuilder, CommandCode, CommandFrame, ElementAddress, ResultCode, ResultFrame};

use crate::error::Result;

/// Outcome of a find-element-by-system-identifier lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindResult {
    pub result_code: ResultCode,
    pub address: ElementAddress,
}

impl FindResult {
    /// The address in `"<segment>_<offset>"` form.
    pub fn identifier(&self) -> String {
        self.address.to_string()
    }
}

/// Request payload: `u32 byte length` followed by the identifier's bytes.
pub fn find_element_by_system_identifier(idtf: &str) -> Result<CommandFrame> {
    let mut builder =
        CommandBuilder::with_capacity(CommandCode::FindElementBySysIdtf, 0, 4 + idtf.len());
    builder.put_str_with_len(idtf)?;
    Ok(builder.finish()?)
}

/// Result payload: a single `u32` element address.
pub fn parse_find_result(frame: &ResultFrame) -> Result<FindResult> {
    Ok(FindResult {
        result_code: frame.result_code(),
        address: frame.payload_addr(0)?,
    })
}

/// Drain request: header only.
pub fn event_emit() -> CommandFrame {
    CommandFrame::empty(CommandCode::EventEmit)
}
