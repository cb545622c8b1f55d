use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use scwire_frame::ElementAddress;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub identifier: String,
    pub found: bool,
    pub address: Option<String>,
    pub raw: Option<u32>,
}

impl Resolved {
    pub fn found(identifier: &str, address: ElementAddress) -> Self {
        Self {
            identifier: identifier.to_string(),
            found: true,
            address: Some(address.to_string()),
            raw: Some(address.raw()),
        }
    }

    pub fn missing(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            found: false,
            address: None,
            raw: None,
        }
    }
}

#[derive(Serialize)]
struct EventOutput {
    subscription: u32,
    address: String,
    raw: u32,
    argument: u32,
    timestamp: String,
}

#[derive(Serialize)]
struct AddressOutput {
    identifier: String,
    raw: u32,
    hex: String,
    segment: u16,
    offset: u16,
}

pub fn print_resolved(results: &[Resolved], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(results),
        OutputFormat::Table => {
            let mut table = new_table(vec!["IDENTIFIER", "ADDRESS", "RAW"]);
            for result in results {
                table.add_row(vec![
                    result.identifier.clone(),
                    result.address.clone().unwrap_or_else(|| "-".to_string()),
                    result
                        .raw
                        .map(|raw| format!("{raw:#010x}"))
                        .unwrap_or_else(|| "-".to_string()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for result in results {
                match &result.address {
                    Some(address) => println!("{} -> {}", result.identifier, address),
                    None => println!("{} -> not found", result.identifier),
                }
            }
        }
    }
}

pub fn print_event(subscription: u32, address: ElementAddress, argument: u32, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&EventOutput {
            subscription,
            address: address.to_string(),
            raw: address.raw(),
            argument,
            timestamp: now_unix_seconds(),
        }),
        OutputFormat::Table => {
            let mut table = new_table(vec!["SUBSCRIPTION", "ADDRESS", "ARGUMENT"]);
            table.add_row(vec![
                subscription.to_string(),
                address.to_string(),
                argument.to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("event subscription={subscription} address={address} argument={argument}");
        }
    }
}

pub fn print_address(address: ElementAddress, format: OutputFormat) {
    let out = AddressOutput {
        identifier: address.to_string(),
        raw: address.raw(),
        hex: format!("{:#010x}", address.raw()),
        segment: address.segment(),
        offset: address.offset(),
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["IDENTIFIER", "RAW", "HEX", "SEGMENT", "OFFSET"]);
            table.add_row(vec![
                out.identifier,
                out.raw.to_string(),
                out.hex,
                out.segment.to_string(),
                out.offset.to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{} = {} ({})", out.identifier, out.raw, out.hex),
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
