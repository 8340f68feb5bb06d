//! # Trace Replay
//!
//! Replays a recorded trace against fresh scanners and registers.
//!
//! ## Usage
//! ```bash
//! replay <trace.csv|trace.json> [--config path]
//! ```
//!
//! ## Exit Codes
//! - `0` every event matched its recording
//! - `1` a result differed from the recording
//! - `2` usage, configuration or IO error

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use checkout_replay::replay_file;
use checkout_session::CheckoutConfig;
use tracing::error;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: replay <trace.csv|trace.json> [--config path]";

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let mut trace_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                match args.get(i) {
                    Some(path) => config_path = Some(PathBuf::from(path)),
                    None => return usage_error(),
                }
            }
            "--help" | "-h" => {
                println!("{}", USAGE);
                return ExitCode::SUCCESS;
            }
            arg if trace_path.is_none() => trace_path = Some(PathBuf::from(arg)),
            _ => return usage_error(),
        }
        i += 1;
    }

    let Some(trace_path) = trace_path else {
        return usage_error();
    };

    let config = match CheckoutConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    match replay_file(&trace_path, config) {
        Ok(report) => {
            println!(
                "OK: {} events in {} sessions ({} traces)",
                report.events, report.sessions, report.traces
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("FAILED: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn usage_error() -> ExitCode {
    eprintln!("{}", USAGE);
    ExitCode::from(2)
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show every replayed event
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
