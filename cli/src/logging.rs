//! Logging initialization: logs go only to a file (or are dropped), never to the console.
//!
//! - **RUST_LOG**: filter, e.g. `info`, `safora=debug`. Default: `warn`.
//! - **LOG_FILE**: when set, logs are appended to this file.
//!   Otherwise a daily file under `$XDG_STATE_HOME/safora/logs` is used; if that directory
//!   cannot be created, logs are dropped so stdout stays clean for the reply.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::log_format::TextWithSpanIds;

const APP_NAME: &str = "safora";

/// Installs the global subscriber. Keep the returned guard alive until exit so buffered
/// lines are flushed.
pub fn init() -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let filter = config::env_filter("warn");

    if let Ok(path) = std::env::var("LOG_FILE") {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        let file_layer = tracing_subscriber::fmt::layer()
            .event_format(TextWithSpanIds::new())
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(filter);
        tracing_subscriber::registry().with(file_layer).try_init()?;
        tracing::info!(path = %path, "safora logging to file");
        return Ok(Some(guard));
    }

    match config::file_writer(APP_NAME) {
        Ok((writer, guard)) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .event_format(TextWithSpanIds::new())
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(file_layer).try_init()?;
            Ok(Some(guard))
        }
        Err(_) => {
            let sink_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::sink)
                .with_filter(filter);
            tracing_subscriber::registry().with(sink_layer).try_init()?;
            Ok(None)
        }
    }
}
