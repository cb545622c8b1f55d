use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::info;

use crate::cmd::{parse_duration, WatchArgs};
use crate::exit::{client_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS};
use crate::output::{print_event, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let period = parse_duration(&args.period)?;
    let client = args.conn.connect()?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let printed = Arc::new(AtomicUsize::new(0));
    for &id in &args.subscriptions {
        let printed = Arc::clone(&printed);
        let limit = args.count;
        client.register_event(id, move |address, argument| {
            if limit.is_some_and(|limit| printed.load(Ordering::SeqCst) >= limit) {
                return;
            }
            print_event(id, address, argument, format);
            printed.fetch_add(1, Ordering::SeqCst);
        });
    }

    client
        .start_event_pump(period)
        .map_err(|err| client_error("event loop failed to start", err))?;
    info!(subscriptions = ?args.subscriptions, ?period, "watching events");

    while running.load(Ordering::SeqCst) {
        if args
            .count
            .is_some_and(|count| printed.load(Ordering::SeqCst) >= count)
        {
            break;
        }
        if client.is_closed() {
            client.shutdown();
            return Err(CliError::new(FAILURE, "connection to graph store lost"));
        }
        thread::sleep(POLL_INTERVAL);
    }

    client.shutdown();
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
