mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "scwire", version, about = "Graph store protocol client")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resolve_subcommand() {
        let cli = Cli::try_parse_from([
            "scwire",
            "resolve",
            "node_1",
            "node_2",
            "--endpoint",
            "tcp://127.0.0.1:55770",
        ])
        .expect("resolve args should parse");

        match cli.command {
            Command::Resolve(args) => {
                assert_eq!(args.identifiers, ["node_1", "node_2"]);
                assert_eq!(args.conn.endpoint, "tcp://127.0.0.1:55770");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn resolve_requires_an_identifier() {
        let err = Cli::try_parse_from(["scwire", "resolve"]).expect_err("missing idtf should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_watch_subscriptions() {
        let cli = Cli::try_parse_from([
            "scwire",
            "watch",
            "--subscription",
            "5,6",
            "--period",
            "250ms",
        ])
        .expect("watch args should parse");

        match cli.command {
            Command::Watch(args) => {
                assert_eq!(args.subscriptions, [5, 6]);
                assert_eq!(args.period, "250ms");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_global_format_after_subcommand() {
        let cli = Cli::try_parse_from(["scwire", "addr", "1_2", "--format", "json"])
            .expect("addr args should parse");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.command, Command::Addr(_)));
    }
}
