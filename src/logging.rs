use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over `level`.
///
/// With a `log_dir`, output goes to a daily rolling `veris.log` there,
/// otherwise to stdout. Keep the returned guard alive until exit so buffered
/// lines are flushed.
pub fn init(level: &str, log_dir: Option<&Path>) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_dir {
        Some(dir) => {
            let file_appender = rolling::daily(dir, "veris.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            fmt()
                .with_env_filter(filter)
                .with_writer(non_blocking)
                .with_ansi(false) // no color codes in file
                .init();
            guard
        }
        None => {
            let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
            fmt().with_env_filter(filter).with_writer(non_blocking).init();
            guard
        }
    }
}
