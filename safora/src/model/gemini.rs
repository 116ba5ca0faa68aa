//! Gemini `generateContent` client over HTTP.
//!
//! Sends role-tagged `contents`, the requested grounding tools (`googleMaps`,
//! `googleSearch`), an optional `toolConfig.retrievalConfig.latLng` bias and the system
//! instruction; reads back the first candidate's text parts and
//! `groundingMetadata.groundingChunks`.
//!
//! Base URL can be overridden (e.g. `GEMINI_BASE_URL`) so tests can point it at a local server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{
    GroundingChunk, ModelClient, ModelError, ModelRequest, ModelResponse, ToolCapability,
};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini REST client implementing [`ModelClient`].
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }

    /// Overrides the API origin (builder). A trailing `/` is ignored.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<WireContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireInstruction<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct WireContent<'a> {
    role: &'a str,
    parts: Vec<WirePartOut<'a>>,
}

#[derive(Serialize)]
struct WireInstruction<'a> {
    parts: Vec<WirePartOut<'a>>,
}

#[derive(Serialize)]
struct WirePartOut<'a> {
    text: &'a str,
}

fn tool_json(tool: ToolCapability) -> serde_json::Value {
    match tool {
        ToolCapability::GoogleMaps => serde_json::json!({ "googleMaps": {} }),
        ToolCapability::GoogleSearch => serde_json::json!({ "googleSearch": {} }),
    }
}

fn build_body(request: &ModelRequest) -> GenerateContentBody<'_> {
    let contents = request
        .turns
        .iter()
        .map(|t| WireContent {
            role: t.role.as_str(),
            parts: vec![WirePartOut { text: &t.text }],
        })
        .collect();
    let system_instruction = request.system_instruction.as_deref().map(|s| WireInstruction {
        parts: vec![WirePartOut { text: s }],
    });
    let tool_config = request.location.map(|loc| {
        serde_json::json!({
            "retrievalConfig": {
                "latLng": { "latitude": loc.lat, "longitude": loc.lng }
            }
        })
    });
    GenerateContentBody {
        contents,
        system_instruction,
        tools: request.tools.iter().copied().map(tool_json).collect(),
        tool_config,
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<WirePartIn>,
}

#[derive(Deserialize, Default)]
struct WirePartIn {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

/// First candidate only; text parts are concatenated, `None` when there are none.
fn into_model_response(resp: GenerateContentResponse) -> ModelResponse {
    let Some(first) = resp.candidates.into_iter().next() else {
        return ModelResponse::default();
    };
    let text: String = first
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    ModelResponse {
        text: if text.is_empty() { None } else { Some(text) },
        chunks: first
            .grounding_metadata
            .map(|m| m.grounding_chunks)
            .unwrap_or_default(),
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        if self.api_key.trim().is_empty() {
            return Err(ModelError::MissingApiKey);
        }
        let body = build_body(request);
        tracing::debug!(
            model = %request.model,
            turns = request.turns.len(),
            tools = request.tools.len(),
            has_location = request.location.is_some(),
            "gemini generateContent"
        );
        let res = self
            .http
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ModelError::Status { status, body });
        }
        let raw = res
            .text()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&raw).map_err(|e| ModelError::Decode(e.to_string()))?;
        let out = into_model_response(parsed);
        tracing::debug!(
            has_text = out.text.is_some(),
            chunks = out.chunks.len(),
            "gemini response"
        );
        Ok(out)
    }
}
