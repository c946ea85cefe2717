use clap::Parser;
use std::path::PathBuf;

// Build version with target info
const VERSION_INFO: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\n",
    "Backend: simulated (in-memory)"
);

/// Replay a trace of media events and calls through a playback session
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// JSON trace to replay (array of steps). Without it only the ready
    /// checkpoint runs.
    #[arg(value_name = "TRACE")]
    pub trace: Option<PathBuf>,

    /// Session options JSON file
    #[arg(short = 'o', long = "options", value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Source already applied to the backend before the session attaches
    #[arg(short = 's', long = "src", value_name = "URL")]
    pub src: Option<String>,

    /// Backend readiness at attach time (0-4)
    #[arg(long = "ready-state", value_name = "N", default_value = "0",
          value_parser = clap::value_parser!(u8).range(0..=4))]
    pub ready_state: u8,

    /// Backend network state at attach time (0-3)
    #[arg(long = "network-state", value_name = "N",
          value_parser = clap::value_parser!(u8).range(0..=3))]
    pub network_state: Option<u8>,

    /// Write the log to a file instead of stderr
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_replay_flags() {
        let args = Args::try_parse_from([
            "playctl",
            "trace.json",
            "--src",
            "a.mp4",
            "--ready-state",
            "4",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.trace, Some(PathBuf::from("trace.json")));
        assert_eq!(args.src.as_deref(), Some("a.mp4"));
        assert_eq!(args.ready_state, 4);
        assert_eq!(args.network_state, None);
        assert_eq!(args.verbosity, 2);
    }

    #[test]
    fn rejects_out_of_range_ready_state() {
        assert!(Args::try_parse_from(["playctl", "--ready-state", "7"]).is_err());
    }
}
