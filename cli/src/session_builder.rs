//! Builds a [`TravelSession`] from resolved settings plus command-line overrides.

use std::sync::Arc;
use std::time::Duration;

use config::SaforaSettings;
use safora::{
    Coordinates, GeminiClient, MockModel, ModelClient, ResponseInterpreter, TravelSession,
};
use thiserror::Error;

/// Session type used by the binary: the model is chosen at runtime.
pub type CliSession = TravelSession<Arc<dyn ModelClient>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("no API key: set GEMINI_API_KEY or API_KEY, or pass --mock")]
    MissingApiKey,
}

/// Command-line overrides layered on top of [`SaforaSettings`].
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Use the canned offline model instead of Gemini.
    pub mock: bool,
    pub model: Option<String>,
    /// Seconds; `Some(0)` disables the timeout.
    pub timeout_secs: Option<u64>,
    /// `--lat/--lng`; wins over `SAFORA_USER_LOCATION`.
    pub location: Option<Coordinates>,
}

impl SessionOptions {
    /// Effective request timeout.
    pub fn timeout(&self, settings: &SaforaSettings) -> Option<Duration> {
        match self.timeout_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => settings.request_timeout,
        }
    }

    /// Effective user location.
    pub fn location(&self, settings: &SaforaSettings) -> Option<Coordinates> {
        self.location.or(settings.user_location)
    }
}

/// Gemini client for `settings`, or [`MockModel::santorini`] when `mock` is set.
pub fn build_client(
    settings: &SaforaSettings,
    mock: bool,
) -> Result<Arc<dyn ModelClient>, BuildError> {
    if mock {
        return Ok(Arc::new(MockModel::santorini()));
    }
    let key = settings.api_key.clone().ok_or(BuildError::MissingApiKey)?;
    Ok(Arc::new(
        GeminiClient::new(key).with_base_url(settings.base_url.clone()),
    ))
}

/// Session centered on the configured default; the user location is applied separately.
pub fn build_session(
    settings: &SaforaSettings,
    opts: &SessionOptions,
) -> Result<CliSession, BuildError> {
    let client = build_client(settings, opts.mock)?;
    let model = opts.model.clone().unwrap_or_else(|| settings.model.clone());
    tracing::info!(model = %model, mock = opts.mock, "building session");
    Ok(
        TravelSession::new(ResponseInterpreter::new(client).with_model(model))
            .with_timeout(opts.timeout(settings))
            .with_initial_focus(settings.default_center),
    )
}
