//! Mock model for tests, demos and offline runs.
//!
//! Returns one fixed [`ModelResponse`] (or one fixed failure) for every request and records
//! the requests it saw. An optional delay keeps a call pending long enough to exercise the
//! session's single-flight guard.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::model::{GroundingChunk, ModelClient, ModelError, ModelRequest, ModelResponse};

enum Outcome {
    Respond(ModelResponse),
    /// Error message; turned into `ModelError::Transport` on each call.
    Fail(String),
}

/// Mock model: fixed response or failure, optional delay, request log.
pub struct MockModel {
    outcome: Outcome,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ModelRequest>>,
}

impl MockModel {
    fn from_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns `response` for every call.
    pub fn new(response: ModelResponse) -> Self {
        Self::from_outcome(Outcome::Respond(response))
    }

    /// Text only, no citations.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(ModelResponse {
            text: Some(text.into()),
            chunks: vec![],
        })
    }

    /// Text and citations.
    pub fn with_chunks(text: impl Into<String>, chunks: Vec<GroundingChunk>) -> Self {
        Self::new(ModelResponse {
            text: Some(text.into()),
            chunks,
        })
    }

    /// Every call fails with a transport error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::from_outcome(Outcome::Fail(message.into()))
    }

    /// Canned Santorini answer with one maps citation and one web citation.
    pub fn santorini() -> Self {
        Self::with_chunks(
            "Here is Santorini: watch the sunset from Oia, then swim at Red Beach.",
            vec![
                GroundingChunk::maps("Oia", "https://maps.google.com/@36.4618,25.3753,15z"),
                GroundingChunk::maps(
                    "Red Beach",
                    "https://www.google.com/maps/search/?api=1&query=36.3481,25.3940",
                ),
                GroundingChunk::web(
                    "Santorini travel guide",
                    "https://en.wikipedia.org/wiki/Santorini",
                ),
            ],
        )
    }

    /// Sleeps `delay` before answering (builder).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `generate` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Copies of the requests seen so far, in call order.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ModelClient for MockModel {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.outcome {
            Outcome::Respond(r) => Ok(r.clone()),
            Outcome::Fail(msg) => Err(ModelError::Transport(msg.clone())),
        }
    }
}
