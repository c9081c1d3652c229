use std::env;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/gman.log";

/// Console output follows `TRACING_LEVEL`; the file at `LOG_FILE_PATH` always keeps
/// debug records so a failed batch can be traced afterwards.
pub fn init_logger() -> impl Drop {
    let level = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_file = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());

    let path = Path::new(&log_file);
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "gman.log".into());

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .without_time()
        .with_ansi(true)
        .with_filter(EnvFilter::new(level));
    let file = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(EnvFilter::new("gman=debug,info"));

    let _ = tracing_subscriber::registry().with(console).with(file).try_init();

    debug!("Logging to stdout and {}", log_file);

    guard
}
