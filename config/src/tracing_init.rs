//! Shared tracing pieces: log directory resolution and a daily rolling file writer.
//!
//! Enabled with feature `tracing-init`. The binary composes the subscriber (filter + format)
//! and keeps the returned guard alive; dropping it flushes the non-blocking writer.

use std::path::PathBuf;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

use crate::LoadError;

/// `$XDG_STATE_HOME/<app>/logs`, falling back to `~/.local/state/<app>/logs`.
pub fn log_dir(app_name: &str) -> Result<PathBuf, LoadError> {
    let base = std::env::var_os("XDG_STATE_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::state_dir)
        .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("state")))
        .ok_or_else(|| LoadError::XdgPath("no state directory".to_string()))?;
    Ok(base.join(app_name).join("logs"))
}

/// Non-blocking writer for `<log_dir>/<app>.log.<date>`; creates the directory.
pub fn file_writer(app_name: &str) -> Result<(NonBlocking, WorkerGuard), LoadError> {
    let dir = log_dir(app_name)?;
    std::fs::create_dir_all(&dir).map_err(LoadError::LogDir)?;
    let appender = tracing_appender::rolling::daily(&dir, format!("{}.log", app_name));
    Ok(tracing_appender::non_blocking(appender))
}

/// `RUST_LOG` filter, `default` when unset or invalid.
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
