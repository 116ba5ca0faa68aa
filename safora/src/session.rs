//! Travel session: conversation, destinations and map focus behind a single-flight guard.
//!
//! [`TravelSession::submit`] is the whole response-handling step:
//!
//! 1. reject empty prompts and submissions while a request is pending;
//! 2. append the user message and move `Idle | Failed → Pending`;
//! 3. interpret the prompt (history before the new message, optional location bias),
//!    bounded by a timeout;
//! 4. on success append the assistant message, replace the destination list and recenter
//!    on the first destination (`Pending → Idle`);
//! 5. on failure append one fallback assistant message and leave destinations and focus
//!    alone (`Pending → Failed`).
//!
//! State lives behind a `std::sync::Mutex` that is never held across the model call, so
//! `submit` takes `&self` and concurrent callers see [`SessionError::Busy`].

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::destination::{select_focus, Destination, DestinationDeriver};
use crate::geo::{Coordinates, DEFAULT_CENTER};
use crate::interpreter::ResponseInterpreter;
use crate::map::{MapController, MapRenderer};
use crate::message::{Conversation, ConversationMessage};
use crate::model::{ModelClient, ModelError};

/// Assistant reply appended when the model call fails.
pub const FALLBACK_REPLY: &str = "I'm having trouble connecting to my global databases. Please check your connection and let's try again!";

/// Default bound on one model call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Submission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitState {
    #[default]
    Idle,
    Pending,
    Failed,
}

/// Submission rejected before anything was appended.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("a request is already in flight")]
    Busy,
}

/// Result of one accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    /// The assistant message that was appended.
    pub reply: ConversationMessage,
    /// Destination list after this turn.
    pub destinations: Vec<Destination>,
    /// Map focus after this turn.
    pub focus: Coordinates,
    /// True when the model call failed and `reply` is the fallback.
    pub failed: bool,
}

/// Copy of the session state for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub messages: Vec<ConversationMessage>,
    pub destinations: Vec<Destination>,
    pub focus: Coordinates,
    pub state: SubmitState,
    pub user_location: Option<Coordinates>,
}

#[derive(Debug)]
struct SessionState {
    conversation: Conversation,
    destinations: Vec<Destination>,
    focus: Coordinates,
    user_location: Option<Coordinates>,
    submit_state: SubmitState,
}

fn lock(inner: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks the session failed if a pending submit is dropped before it finishes.
struct InFlight<'a> {
    inner: &'a Mutex<SessionState>,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("submission cancelled while pending");
            lock(self.inner).submit_state = SubmitState::Failed;
        }
    }
}

/// One user's chat with the travel assistant.
pub struct TravelSession<C> {
    interpreter: ResponseInterpreter<C>,
    deriver: DestinationDeriver,
    timeout: Option<Duration>,
    inner: Mutex<SessionState>,
}

impl<C: ModelClient> TravelSession<C> {
    /// Session centered on [`DEFAULT_CENTER`] with [`DEFAULT_REQUEST_TIMEOUT`].
    pub fn new(interpreter: ResponseInterpreter<C>) -> Self {
        Self {
            interpreter,
            deriver: DestinationDeriver::default(),
            timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            inner: Mutex::new(SessionState {
                conversation: Conversation::new(),
                destinations: Vec::new(),
                focus: DEFAULT_CENTER,
                user_location: None,
                submit_state: SubmitState::Idle,
            }),
        }
    }

    pub fn with_deriver(mut self, deriver: DestinationDeriver) -> Self {
        self.deriver = deriver;
        self
    }

    /// `None` waits for the model indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_initial_focus(self, focus: Coordinates) -> Self {
        lock(&self.inner).focus = focus;
        self
    }

    pub fn interpreter(&self) -> &ResponseInterpreter<C> {
        &self.interpreter
    }

    /// Submits one prompt. See the module docs for the state transitions.
    pub async fn submit(&self, text: &str) -> Result<TurnOutcome, SessionError> {
        let prompt = text.trim();
        if prompt.is_empty() {
            return Err(SessionError::EmptyPrompt);
        }

        let (history, location) = {
            let mut st = lock(&self.inner);
            if st.submit_state == SubmitState::Pending {
                tracing::warn!("submission rejected: request in flight");
                return Err(SessionError::Busy);
            }
            let history = st.conversation.messages().to_vec();
            st.conversation.push(ConversationMessage::user(prompt));
            st.submit_state = SubmitState::Pending;
            (history, st.user_location)
        };
        let guard = InFlight {
            inner: &self.inner,
            armed: true,
        };

        let call = self.interpreter.interpret(prompt, &history, location);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(r) => r,
                Err(_) => {
                    tracing::error!(timeout = ?limit, "model request timed out");
                    Err(ModelError::Timeout(limit))
                }
            },
            None => call.await,
        };
        guard.disarm();

        let mut st = lock(&self.inner);
        let outcome = match result {
            Ok(resp) => {
                let destinations = self.deriver.derive(&resp.links);
                let focus = select_focus(&destinations, st.focus);
                let reply = ConversationMessage::assistant(resp.text, resp.links);
                st.conversation.push(reply.clone());
                st.destinations = destinations.clone();
                st.focus = focus;
                st.submit_state = SubmitState::Idle;
                tracing::info!(
                    links = reply.grounding_links.len(),
                    destinations = destinations.len(),
                    "turn complete"
                );
                TurnOutcome {
                    reply,
                    destinations,
                    focus,
                    failed: false,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "turn failed; appending fallback reply");
                let reply = ConversationMessage::assistant(FALLBACK_REPLY, Vec::new());
                st.conversation.push(reply.clone());
                st.submit_state = SubmitState::Failed;
                TurnOutcome {
                    reply,
                    destinations: st.destinations.clone(),
                    focus: st.focus,
                    failed: true,
                }
            }
        };
        Ok(outcome)
    }

    /// Recenters on a location picked from a grounding link.
    pub fn locate(&self, coordinates: Coordinates) {
        lock(&self.inner).focus = coordinates;
    }

    /// Records the one-shot user position; it biases later requests and recenters the map.
    pub fn apply_geolocation(&self, position: Option<Coordinates>) {
        let Some(position) = position else {
            tracing::debug!("geolocation unavailable");
            return;
        };
        let mut st = lock(&self.inner);
        st.user_location = Some(position);
        st.focus = position;
    }

    pub fn messages(&self) -> Vec<ConversationMessage> {
        lock(&self.inner).conversation.messages().to_vec()
    }

    /// Last assistant message, the one `locate` picks links from.
    pub fn last_reply(&self) -> Option<ConversationMessage> {
        lock(&self.inner).conversation.last_reply().cloned()
    }

    pub fn destinations(&self) -> Vec<Destination> {
        lock(&self.inner).destinations.clone()
    }

    pub fn focus(&self) -> Coordinates {
        lock(&self.inner).focus
    }

    pub fn state(&self) -> SubmitState {
        lock(&self.inner).submit_state
    }

    pub fn is_loading(&self) -> bool {
        self.state() == SubmitState::Pending
    }

    pub fn user_location(&self) -> Option<Coordinates> {
        lock(&self.inner).user_location
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let st = lock(&self.inner);
        SessionSnapshot {
            messages: st.conversation.messages().to_vec(),
            destinations: st.destinations.clone(),
            focus: st.focus,
            state: st.submit_state,
            user_location: st.user_location,
        }
    }

    /// Pushes markers (full replace) and focus to `map`.
    pub fn sync_map<R: MapRenderer>(&self, map: &mut MapController<R>) {
        let (destinations, focus) = {
            let st = lock(&self.inner);
            (st.destinations.clone(), st.focus)
        };
        map.set_markers(&destinations);
        map.set_center(focus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::FixedClock;
    use crate::map::RecordingRenderer;
    use crate::message::Role;
    use crate::model::{GroundingChunk, MockModel};

    fn session(model: MockModel) -> TravelSession<MockModel> {
        TravelSession::new(ResponseInterpreter::new(model))
            .with_deriver(DestinationDeriver::new(FixedClock(1000)))
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_without_appending() {
        let s = session(MockModel::with_text("x"));
        assert_eq!(s.submit("   ").await.unwrap_err(), SessionError::EmptyPrompt);
        assert!(s.messages().is_empty());
        assert_eq!(s.interpreter().client().call_count(), 0);
    }

    #[tokio::test]
    async fn prompt_is_trimmed_and_history_excludes_new_message() {
        let s = session(MockModel::with_text("first"));
        s.submit("  hello  ").await.unwrap();
        s.submit("again").await.unwrap();
        let requests = s.interpreter().client().requests();
        assert_eq!(requests[0].turns.len(), 1);
        assert_eq!(requests[0].turns[0].text, "hello");
        let roles: Vec<_> = requests[1].turns.iter().map(|t| t.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
    }

    #[tokio::test]
    async fn success_appends_reply_and_moves_focus() {
        let s = session(MockModel::with_chunks(
            "two spots",
            vec![
                GroundingChunk::web("Blog", "https://example.com"),
                GroundingChunk::maps("A", "https://maps.google.com/@10.5,20.5"),
                GroundingChunk::maps("B", "https://maps.google.com/?query=30.5,40.5"),
            ],
        ));
        let out = s.submit("go").await.unwrap();
        assert!(!out.failed);
        assert_eq!(out.reply.role, Role::Assistant);
        assert_eq!(out.reply.grounding_links.len(), 3);
        assert_eq!(out.destinations.len(), 2);
        assert_eq!(out.focus, Coordinates::new(10.5, 20.5));
        assert_eq!(s.focus(), Coordinates::new(10.5, 20.5));
        assert_eq!(s.state(), SubmitState::Idle);
        assert_eq!(s.messages().len(), 2);
    }

    #[tokio::test]
    async fn response_without_coordinates_keeps_focus() {
        let s = session(MockModel::with_chunks(
            "no map",
            vec![GroundingChunk::web("Blog", "https://example.com")],
        ));
        let out = s.submit("go").await.unwrap();
        assert!(out.destinations.is_empty());
        assert_eq!(s.focus(), DEFAULT_CENTER);
    }

    #[tokio::test]
    async fn last_reply_tracks_newest_assistant_message() {
        let s = session(MockModel::santorini());
        assert!(s.last_reply().is_none());
        s.submit("Santorini").await.unwrap();
        let reply = s.last_reply().unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.grounding_links.len(), 3);
        s.submit("again").await.unwrap();
        assert_eq!(s.last_reply(), s.messages().last().cloned());
    }

    #[tokio::test]
    async fn failure_appends_one_fallback_and_returns_to_not_loading() {
        let s = session(MockModel::failing("boom"));
        let out = s.submit("go").await.unwrap();
        assert!(out.failed);
        let msgs = s.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1].role, Role::Assistant);
        assert_eq!(msgs[1].text, FALLBACK_REPLY);
        assert!(!s.is_loading());
        assert_eq!(s.state(), SubmitState::Failed);
    }

    #[tokio::test]
    async fn submit_after_failure_is_accepted() {
        let s = session(MockModel::failing("boom"));
        s.submit("one").await.unwrap();
        assert!(s.submit("two").await.is_ok());
        assert_eq!(s.messages().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_counts_as_failure() {
        let s = session(MockModel::with_text("late").with_delay(Duration::from_secs(120)))
            .with_timeout(Some(Duration::from_secs(5)));
        let out = s.submit("go").await.unwrap();
        assert!(out.failed);
        assert_eq!(out.reply.text, FALLBACK_REPLY);
        assert_eq!(s.state(), SubmitState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_submit_does_not_leave_session_pending() {
        let s = session(MockModel::with_text("late").with_delay(Duration::from_secs(120)))
            .with_timeout(None);
        let r = tokio::time::timeout(Duration::from_secs(1), s.submit("go")).await;
        assert!(r.is_err());
        assert_eq!(s.state(), SubmitState::Failed);
        assert!(!s.is_loading());
    }

    #[tokio::test]
    async fn geolocation_biases_requests_and_recenters() {
        let s = session(MockModel::with_text("x"));
        s.apply_geolocation(None);
        assert_eq!(s.focus(), DEFAULT_CENTER);
        let here = Coordinates::new(35.6762, 139.6503);
        s.apply_geolocation(Some(here));
        assert_eq!(s.focus(), here);
        s.submit("near me").await.unwrap();
        assert_eq!(s.interpreter().client().requests()[0].location, Some(here));
    }

    #[tokio::test]
    async fn sync_map_pushes_markers_and_focus() {
        let s = session(MockModel::santorini());
        let mut map = MapController::new(RecordingRenderer::default(), s.focus());
        s.submit("Santorini").await.unwrap();
        s.sync_map(&mut map);
        assert_eq!(map.markers().len(), 2);
        assert_eq!(map.center(), Coordinates::new(36.4618, 25.3753));
        s.locate(Coordinates::new(36.3481, 25.394));
        s.sync_map(&mut map);
        assert_eq!(map.center(), Coordinates::new(36.3481, 25.394));
    }
}
