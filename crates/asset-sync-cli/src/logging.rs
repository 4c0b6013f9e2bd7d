use std::env;
use std::io;
use std::path::Path;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Console plus file logging. Console output goes to stderr when stdout is
/// reserved for machine-readable output.
pub fn init_logger(console_to_stderr: bool) -> WorkerGuard {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter_layer = EnvFilter::new(filter);

    let log_file_path =
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| "./logs/asset-sync.log".to_string());
    let log_file_path = Path::new(&log_file_path);
    let directory = log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file_path
        .file_name()
        .map(|f| f.to_os_string())
        .unwrap_or_else(|| "asset-sync.log".into());

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console = fmt::layer()
        .pretty()
        .with_file(false)
        .without_time()
        .with_ansi(!console_to_stderr);
    let console = if console_to_stderr {
        console.with_writer(io::stderr).boxed()
    } else {
        console.with_writer(io::stdout).boxed()
    };

    tracing_subscriber::registry()
        .with(console)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter_layer)
        .init();

    debug!("Tracing is configured for console and file logging.");

    guard
}
