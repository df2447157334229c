//! shiftboard - command-line access to event staffing data.
//!
//! Loads events, resource types and templates from the shiftboard API into
//! an `EventStore` and runs one command against it per invocation.

mod commands;
mod render;

use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use shiftboard_core::{ApiClient, ApiError, Config, EventStore};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Command;

// ============================================================================
// Constants
// ============================================================================

/// Log file name prefix inside the log directory (rotated daily)
const LOG_FILE_PREFIX: &str = "shiftboard.log";

/// Daily rolling appender in `dir`, or the reason it could not be created
fn file_appender(dir: &Path) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)
        .with_context(|| format!("Failed to open log directory {}", dir.display()))
}

/// Initialize the tracing subscriber for logging.
///
/// Console output goes to stderr and is filtered by `RUST_LOG` (default
/// `warn`). When the log directory is usable, everything at debug level and
/// above is also written to a daily log file; the returned guard flushes it
/// on drop. Otherwise logging stays console-only.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let console = fmt::layer().with_writer(io::stderr).with_filter(filter);

    let appender = config.log_dir().and_then(|dir| file_appender(&dir));
    let (file_layer, guard, file_error) = match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new("shiftboard_core=debug,shiftboard=debug"));
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry().with(console).with(file_layer).init();
    if let Some(e) = file_error {
        warn!("File logging disabled: {:#}", e);
    }
    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n", e);
            eprintln!("{}", commands::USAGE);
            return ExitCode::from(2);
        }
    };

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    let _guard = init_tracing(&config);
    info!(api_url = config.api_url(), "shiftboard starting");

    match run(command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: Config) -> Result<()> {
    let api = ApiClient::from_config(&config)?;
    let mut store = EventStore::new(api);
    debug!(?command, "Running command");
    commands::execute(&mut store, command).await
}

fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<ApiError>() {
        Some(api_err) if api_err.is_not_found() => eprintln!("Not found: {:#}", err),
        Some(ApiError::Unauthorized) => {
            eprintln!("Error: {:#}\nSet a token with `shiftboard configure <api-url> <token>` or SHIFTBOARD_TOKEN.", err)
        }
        _ => eprintln!("Error: {:#}", err),
    }
}
