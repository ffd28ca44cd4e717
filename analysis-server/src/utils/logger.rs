//! Logging Infrastructure
//!
//! Structured logging setup for development (pretty) and production (JSON, daily files).

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with defaults (info, stdout)
pub fn init_logger() {
    init_logger_with_file(None, None, None);
}

/// Initialize the logger with optional JSON format and file output
///
/// `RUST_LOG` wins over `log_level` when set. Calling this twice is harmless.
pub fn init_logger_with_file(log_level: Option<&str>, json: Option<bool>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("analysis_server={level},tower_http={level}")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // Add file output if log_dir is provided
    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if std::fs::create_dir_all(log_path).is_ok() {
            let file_appender = tracing_appender::rolling::daily(log_path, "analysis-server");
            let result = if json.unwrap_or(false) {
                builder.json().with_writer(file_appender).try_init()
            } else {
                builder.with_ansi(false).with_writer(file_appender).try_init()
            };
            if let Err(e) = result {
                eprintln!("logger already initialized: {e}");
            }
            return;
        }
    }

    let result = if json.unwrap_or(false) {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("logger already initialized: {e}");
    }
}
