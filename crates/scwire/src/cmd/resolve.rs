use tracing::debug;

use crate::cmd::ResolveArgs;
use crate::exit::{client_error, is_missing, CliResult, FAILURE, SUCCESS};
use crate::output::{print_resolved, OutputFormat, Resolved};

pub fn run(args: ResolveArgs, format: OutputFormat) -> CliResult<i32> {
    let client = args.conn.connect()?;

    // Queue every lookup up front; the pipeline still sends them one at a time.
    let handles = args
        .identifiers
        .iter()
        .map(|idtf| client.find_element_by_system_identifier(idtf))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| client_error("invalid identifier", err))?;

    let mut results = Vec::with_capacity(handles.len());
    for (idtf, handle) in args.identifiers.iter().zip(handles) {
        match handle.wait() {
            Ok(found) => results.push(Resolved::found(idtf, found.address)),
            Err(err) if is_missing(&err) => {
                debug!(identifier = %idtf, "no element");
                results.push(Resolved::missing(idtf));
            }
            Err(err) => return Err(client_error(&format!("resolve {idtf} failed"), err)),
        }
    }
    client.shutdown();

    print_resolved(&results, format);
    if results.iter().all(|result| result.found) {
        Ok(SUCCESS)
    } else {
        Ok(FAILURE)
    }
}
