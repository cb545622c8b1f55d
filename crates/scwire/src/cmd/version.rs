use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("scwire {}", env!("CARGO_PKG_VERSION"));
    if !args.extended {
        return Ok(SUCCESS);
    }

    println!(
        "target: {}",
        option_env!("SCWIRE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("features: async={}, cli=true", cfg!(feature = "async"));
    println!(
        "defaults: task_delay={:?} request_timeout={:?} event_period={:?}",
        scwire_client::config::DEFAULT_TASK_DELAY,
        scwire_client::config::DEFAULT_REQUEST_TIMEOUT,
        scwire_client::config::DEFAULT_EVENT_PERIOD,
    );

    Ok(SUCCESS)
}
