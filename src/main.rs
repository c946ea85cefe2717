use playctl::cli::Args;
use playctl::config;
use playctl::core::backend::{NetworkState, ReadyState};
use playctl::shell::{self, Shell};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

fn main() -> Result<()> {
    // Parse command-line arguments first (needed for log setup)
    let args = Args::parse();

    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path) = &args.log_file {
        let file = std::fs::File::create(log_path)
            .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }

    debug!("Command-line args: {:?}", args);

    let options = match &args.options {
        Some(path) => config::load_options(path)?,
        None => Default::default(),
    };
    let steps = match &args.trace {
        Some(path) => shell::load_trace(path)?,
        None => Vec::new(),
    };

    let ready = ReadyState::from_code(args.ready_state).unwrap_or_default();
    let network = args.network_state.and_then(NetworkState::from_code);

    let mut shell = Shell::new(options, args.src.as_deref(), network, ready)?;
    for line in shell.start() {
        println!("{}", line);
    }
    for line in shell.run(&steps)? {
        println!("{}", line);
    }

    info!("Replayed {} steps", steps.len());
    Ok(())
}
