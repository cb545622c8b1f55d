use std::time::Duration;

use clap::{Args, Subcommand};
use scwire_client::{ClientConfig, ScClient};

use crate::exit::{client_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod addr;
pub mod resolve;
pub mod version;
pub mod watch;

pub const DEFAULT_ENDPOINT: &str = "tcp://127.0.0.1:55770";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve system identifiers to element addresses.
    Resolve(ResolveArgs),
    /// Drain events periodically and print those for the given subscriptions.
    Watch(WatchArgs),
    /// Convert between an element address and its "segment_offset" form (offline).
    Addr(AddrArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Resolve(args) => resolve::run(args, format),
        Command::Watch(args) => watch::run(args, format),
        Command::Addr(args) => addr::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Graph store endpoint (tcp://host:port, host:port or unix:///path).
    #[arg(long, short = 'e', env = "SCWIRE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
    /// Connection timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub connect_timeout: String,
    /// Bound on waiting for each result (e.g. 30s, 500ms).
    #[arg(long, default_value = "30s")]
    pub timeout: String,
}

impl ConnectArgs {
    pub fn config(&self) -> CliResult<ClientConfig> {
        let mut config = ClientConfig {
            connect_timeout: Some(parse_duration(&self.connect_timeout)?),
            event_period: None,
            ..ClientConfig::default()
        };
        config.pipeline.request_timeout = Some(parse_duration(&self.timeout)?);
        Ok(config)
    }

    pub fn connect(&self) -> CliResult<ScClient> {
        let config = self.config()?;
        scwire_client::connect_with_config(&self.endpoint, &config)
            .map_err(|err| client_error("connect failed", err))
    }
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// System identifiers to look up.
    #[arg(required = true)]
    pub identifiers: Vec<String>,
    #[command(flatten)]
    pub conn: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Subscription ids to print (comma-separated).
    #[arg(long, short = 's', value_delimiter = ',', required = true)]
    pub subscriptions: Vec<u32>,
    /// Drain period (e.g. 5s, 250ms).
    #[arg(long, default_value = "5s")]
    pub period: String,
    /// Exit after printing N events.
    #[arg(long)]
    pub count: Option<usize>,
    #[command(flatten)]
    pub conn: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct AddrArgs {
    /// "segment_offset" identifier, or a raw address (decimal or 0x-prefixed hex).
    pub value: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `"5s"`, `"500ms"` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
