use scwire_frame::{address_from_identifier, ElementAddress};

use crate::cmd::AddrArgs;
use crate::exit::{frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_address, OutputFormat};

pub fn run(args: AddrArgs, format: OutputFormat) -> CliResult<i32> {
    let address = parse_address(&args.value)?;
    print_address(address, format);
    Ok(SUCCESS)
}

fn parse_address(input: &str) -> CliResult<ElementAddress> {
    let input = input.trim();
    if input.contains('_') {
        return address_from_identifier(input).map_err(|err| frame_error("invalid identifier", err));
    }

    let raw = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => input.parse(),
    }
    .map_err(|_| CliError::new(USAGE, format!("invalid address: {input}")))?;
    Ok(ElementAddress::from_raw(raw))
}
