//! Response interpreter: turns a prompt plus history into model text and grounding links.
//!
//! [`ResponseInterpreter::interpret`] builds the [`ModelRequest`] (history as role-tagged
//! turns, the new prompt last, maps + search grounding, optional location bias), calls the
//! [`ModelClient`] once and normalizes the answer. Citation handling lives in the pure
//! [`links_from_chunks`] so it can be tested without a model.

use crate::coordinates::CoordinateExtractor;
use crate::geo::Coordinates;
use crate::message::{ConversationMessage, GroundingLink};
use crate::model::{
    GroundingChunk, ModelClient, ModelError, ModelRequest, ToolCapability, Turn, DEFAULT_MODEL,
};
use crate::prompts::SAFORA_SYSTEM_INSTRUCTION;

/// Reply text used when the model answers without any text.
pub const EMPTY_REPLY_TEXT: &str = "I'm sorry, I couldn't process that request.";

/// Link title used when a citation has a URI but no title.
pub const DEFAULT_LINK_TITLE: &str = "Location Info";

/// Interpreted model answer.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpretedResponse {
    pub text: String,
    pub links: Vec<GroundingLink>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

/// Maps citations to links in input order.
///
/// URI and title come from the maps source first, then the web source; chunks without any
/// URI are dropped. Coordinates come from `extractor`.
pub fn links_from_chunks(
    chunks: &[GroundingChunk],
    extractor: &CoordinateExtractor,
) -> Vec<GroundingLink> {
    let mut links = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let maps = chunk.maps.as_ref();
        let web = chunk.web.as_ref();
        let uri = maps
            .and_then(|s| non_empty(&s.uri))
            .or_else(|| web.and_then(|s| non_empty(&s.uri)));
        let Some(uri) = uri else {
            tracing::debug!(index = i, "grounding chunk without uri dropped");
            continue;
        };
        let title = maps
            .and_then(|s| non_empty(&s.title))
            .or_else(|| web.and_then(|s| non_empty(&s.title)))
            .unwrap_or(DEFAULT_LINK_TITLE);
        links.push(GroundingLink {
            title: title.to_string(),
            uri: uri.to_string(),
            coordinates: extractor.extract(uri),
        });
    }
    links
}

/// Builds the role-tagged turns: history first, then `prompt` as the final user turn.
pub fn build_turns(prompt: &str, history: &[ConversationMessage]) -> Vec<Turn> {
    let mut turns: Vec<Turn> = history
        .iter()
        .map(|m| Turn {
            role: m.role.wire_name().to_string(),
            text: m.text.clone(),
        })
        .collect();
    turns.push(Turn::user(prompt));
    turns
}

/// Calls the model for one prompt and normalizes text and citations.
pub struct ResponseInterpreter<C> {
    client: C,
    model: String,
    system_instruction: Option<String>,
    extractor: CoordinateExtractor,
}

impl<C: ModelClient> ResponseInterpreter<C> {
    /// Default model, Safora system instruction, default coordinate patterns.
    pub fn new(client: C) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            system_instruction: Some(SAFORA_SYSTEM_INSTRUCTION.to_string()),
            extractor: CoordinateExtractor::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// `None` sends no system instruction.
    pub fn with_system_instruction(mut self, instruction: Option<String>) -> Self {
        self.system_instruction = instruction;
        self
    }

    pub fn with_extractor(mut self, extractor: CoordinateExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request for `prompt` after `history`, biased toward `location` when given.
    pub fn build_request(
        &self,
        prompt: &str,
        history: &[ConversationMessage],
        location: Option<Coordinates>,
    ) -> ModelRequest {
        ModelRequest {
            model: self.model.clone(),
            system_instruction: self.system_instruction.clone(),
            turns: build_turns(prompt, history),
            tools: vec![ToolCapability::GoogleMaps, ToolCapability::GoogleSearch],
            location,
        }
    }

    /// One model call; errors are logged and returned as-is, never retried.
    pub async fn interpret(
        &self,
        prompt: &str,
        history: &[ConversationMessage],
        location: Option<Coordinates>,
    ) -> Result<InterpretedResponse, ModelError> {
        let request = self.build_request(prompt, history, location);
        let response = match self.client.generate(&request).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "model request failed");
                return Err(e);
            }
        };
        let text = match response.text {
            Some(t) if !t.is_empty() => t,
            _ => {
                tracing::warn!("model returned no text");
                EMPTY_REPLY_TEXT.to_string()
            }
        };
        let links = links_from_chunks(&response.chunks, &self.extractor);
        tracing::debug!(
            chunks = response.chunks.len(),
            links = links.len(),
            "interpreted model response"
        );
        Ok(InterpretedResponse { text, links })
    }
}
