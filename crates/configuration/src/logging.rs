use crate::error::ConfigError;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global tracing subscriber.
///
/// Console output is always on and filtered by `RUST_LOG` (default `info`).
/// With a `log_dir`, events are also appended to a daily rolling file there;
/// the returned guard must live until the process exits or buffered lines
/// are lost.
pub fn init_tracing(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = fmt::layer().with_target(false);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "plantwatch.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = fmt::layer().with_ansi(false).with_writer(writer);

            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(file)
                .try_init()
                .map_err(|e| ConfigError::LoggingError(e.to_string()))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .try_init()
                .map_err(|e| ConfigError::LoggingError(e.to_string()))?;
            Ok(None)
        }
    }
}
