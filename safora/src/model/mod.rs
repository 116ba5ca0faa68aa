//! Generative model collaborator.
//!
//! The interpreter talks to the hosted model only through [`ModelClient`]: it hands over a
//! [`ModelRequest`] (role-tagged turns, requested grounding tools, optional location bias)
//! and gets back a [`ModelResponse`] (text plus grounding chunks). Implementations:
//! [`MockModel`] (fixed response, for tests and offline runs) and [`GeminiClient`]
//! (Gemini `generateContent` over HTTP).

mod gemini;
mod mock;

pub use gemini::{GeminiClient, DEFAULT_GEMINI_BASE_URL};
pub use mock::MockModel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinates;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// Error from a model call. The interpreter never retries; callers surface a fallback reply.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Network or connection failure.
    #[error("model transport error: {0}")]
    Transport(String),
    /// Non-success HTTP status.
    #[error("model returned {status}: {body}")]
    Status { status: u16, body: String },
    /// Response body could not be decoded.
    #[error("model response decode error: {0}")]
    Decode(String),
    /// No API key configured.
    #[error("missing API key (set GEMINI_API_KEY)")]
    MissingApiKey,
    /// No answer within the configured deadline.
    #[error("model request timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Tool capability the model may use while answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCapability {
    /// Maps grounding: citations point at places with map links.
    GoogleMaps,
    /// General web search grounding.
    GoogleSearch,
}

/// One role-tagged text turn (`"user"` or `"model"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: String,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            text: text.into(),
        }
    }
}

/// Everything the model needs for one answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    /// Prior turns followed by the new prompt as the final user turn.
    pub turns: Vec<Turn>,
    pub tools: Vec<ToolCapability>,
    /// Retrieval bias from the user's location.
    pub location: Option<Coordinates>,
}

/// Title/URI pair of one citation source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkSource {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

impl ChunkSource {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            uri: Some(uri.into()),
        }
    }
}

/// One grounding citation; maps and web sources are both optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub maps: Option<ChunkSource>,
    #[serde(default)]
    pub web: Option<ChunkSource>,
}

impl GroundingChunk {
    pub fn maps(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            maps: Some(ChunkSource::new(title, uri)),
            web: None,
        }
    }

    pub fn web(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            maps: None,
            web: Some(ChunkSource::new(title, uri)),
        }
    }
}

/// Model answer: optional text and citations in model order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub text: Option<String>,
    pub chunks: Vec<GroundingChunk>,
}

/// Hosted model: one request in, one response out.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError>;
}

#[async_trait]
impl<T: ModelClient + ?Sized> ModelClient for std::sync::Arc<T> {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        (**self).generate(request).await
    }
}
