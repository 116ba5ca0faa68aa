//! Typed Safora settings resolved from the process environment.
//!
//! Call [`crate::load_and_apply`] first so `.env` and XDG values are visible here.
//! Defaults come from the `safora` crate so there is one source for each.

use std::time::Duration;

use safora::{
    Coordinates, DEFAULT_CENTER, DEFAULT_GEMINI_BASE_URL, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT,
};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("{key}: expected \"lat,lng\", got {value:?}")]
    InvalidPair { key: &'static str, value: String },
    #[error("{key}: expected a whole number of seconds, got {value:?}")]
    InvalidTimeout { key: &'static str, value: String },
}

/// Everything the CLI needs to build a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SaforaSettings {
    /// `GEMINI_API_KEY`, falling back to `API_KEY`.
    pub api_key: Option<String>,
    /// `SAFORA_MODEL`.
    pub model: String,
    /// `GEMINI_BASE_URL`.
    pub base_url: String,
    /// `SAFORA_REQUEST_TIMEOUT_SECS`; `0` disables the timeout.
    pub request_timeout: Option<Duration>,
    /// `SAFORA_DEFAULT_CENTER` as `lat,lng`.
    pub default_center: Coordinates,
    /// `SAFORA_USER_LOCATION` as `lat,lng`.
    pub user_location: Option<Coordinates>,
}

impl Default for SaforaSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            default_center: DEFAULT_CENTER,
            user_location: None,
        }
    }
}

fn parse_pair(key: &'static str, value: &str) -> Result<Coordinates, SettingsError> {
    Coordinates::parse_pair(value).ok_or_else(|| SettingsError::InvalidPair {
        key,
        value: value.to_string(),
    })
}

impl SaforaSettings {
    /// Resolves settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Resolves settings from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let mut s = Self::default();

        s.api_key = get("GEMINI_API_KEY").or_else(|| get("API_KEY"));
        if let Some(model) = get("SAFORA_MODEL") {
            s.model = model;
        }
        if let Some(url) = get("GEMINI_BASE_URL") {
            s.base_url = url;
        }
        if let Some(raw) = get("SAFORA_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| SettingsError::InvalidTimeout {
                    key: "SAFORA_REQUEST_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
            s.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(raw) = get("SAFORA_DEFAULT_CENTER") {
            s.default_center = parse_pair("SAFORA_DEFAULT_CENTER", &raw)?;
        }
        if let Some(raw) = get("SAFORA_USER_LOCATION") {
            s.user_location = Some(parse_pair("SAFORA_USER_LOCATION", &raw)?);
        }
        Ok(s)
    }
}
