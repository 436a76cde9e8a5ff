//! Logging and observability helpers.

use std::fs;
use std::path::PathBuf;

use tracing::Level;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crate::driver::traits::LoggingGate;

const LOG_FILE_PREFIX: &str = "sqlspy.log";

/// Tracing target carrying SQL spy output. The logging gate answers from
/// this target's current filter level.
pub const SQL_TARGET: &str = "sqlspy::sql";

pub fn init_tracing() {
    let log_dir = log_directory();
    let _ = fs::create_dir_all(&log_dir);

    let file_appender: RollingFileAppender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sqlspy=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(file_appender)
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}

fn log_directory() -> PathBuf {
    if cfg!(windows) {
        let appdata = std::env::var_os("APPDATA")
            .unwrap_or_else(|| std::env::var_os("USERPROFILE").unwrap_or_default());
        let mut path = PathBuf::from(appdata);
        path.push("SqlSpy");
        path.push("logs");
        path
    } else {
        let home = std::env::var_os("HOME").unwrap_or_default();
        let mut path = PathBuf::from(home);
        path.push(".sqlspy");
        path.push("logs");
        path
    }
}

/// True when SQL logging output is currently enabled.
///
/// Re-evaluated against the active subscriber on every call; runtime filter
/// changes take effect on the next connect.
pub fn sql_logging_enabled() -> bool {
    tracing::enabled!(target: "sqlspy::sql", Level::DEBUG)
}

/// Production gate backed by the tracing subscriber's current filter.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingGate;

impl LoggingGate for TracingGate {
    fn sql_logging_enabled(&self) -> bool {
        sql_logging_enabled()
    }
}
