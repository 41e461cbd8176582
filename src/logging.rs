use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "KEYBASKET_LOG";

pub fn log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keybasket")
}

/// Route `tracing` output to `<data_dir>/keybasket/keybasket.log`. The
/// terminal is owned by the UI, so nothing is ever written to stdout/stderr.
///
/// The filter comes from `KEYBASKET_LOG` when set, otherwise from
/// `fallback_filter`. Returns `None` (logging disabled) when the log
/// directory is unusable; the returned guard must live until exit so that
/// buffered lines are flushed.
pub fn init(fallback_filter: &str) -> Option<WorkerGuard> {
    let dir = log_dir();
    fs::create_dir_all(&dir).ok()?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(fallback_filter))
        .unwrap_or_else(|_| EnvFilter::new("keybasket=info"));

    let appender = tracing_appender::rolling::never(&dir, "keybasket.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(guard)
}
