//! # Safora
//!
//! Travel assistant core: send a prompt to a grounded generative model, keep the chat
//! history, and turn the model's map citations into destinations on a map.
//!
//! ## Flow
//!
//! user prompt → [`TravelSession::submit`] → [`ResponseInterpreter::interpret`] (one
//! [`ModelClient`] call) → [`links_from_chunks`] + [`extract_coordinates`] →
//! [`derive_destinations`] → destinations replaced, map focus moved to the first one →
//! [`TravelSession::sync_map`] pushes both to a [`MapController`].
//!
//! ## Main modules
//!
//! - [`coordinates`]: ordered URI pattern matchers (`@lat,lng`, then `query=lat,lng`).
//! - [`interpreter`]: request building and citation normalization.
//! - [`destination`]: [`Destination`], [`derive_destinations`], [`select_focus`].
//! - [`session`]: [`TravelSession`] with the explicit Idle → Pending → Idle/Failed guard.
//! - [`map`]: [`MapController`] owning a [`MapRenderer`].
//! - [`model`]: [`ModelClient`] trait, [`MockModel`], [`GeminiClient`].
//! - [`message`]: [`ConversationMessage`], [`GroundingLink`], [`Conversation`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use safora::{MockModel, ResponseInterpreter, TravelSession};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let session = TravelSession::new(ResponseInterpreter::new(MockModel::santorini()));
//! let turn = session.submit("Plan a trip to Santorini").await.expect("accepted");
//! println!("{}", turn.reply.text);
//! for d in &turn.destinations {
//!     println!("{} {}", d.name, d.coordinates);
//! }
//! # }
//! ```

pub mod coordinates;
pub mod destination;
pub mod geo;
pub mod geolocation;
pub mod interpreter;
pub mod map;
pub mod message;
pub mod model;
pub mod prompts;
pub mod session;

pub use coordinates::{
    extract_coordinates, AtSegmentPattern, CoordinateExtractor, CoordinatePattern,
    QueryParamPattern,
};
pub use destination::{
    derive_destinations, select_focus, Clock, Destination, DestinationDeriver, FixedClock,
    SystemClock, DESTINATION_LABEL,
};
pub use geo::{Coordinates, DEFAULT_CENTER};
pub use geolocation::{FixedLocation, GeolocationSource};
pub use interpreter::{
    build_turns, links_from_chunks, InterpretedResponse, ResponseInterpreter,
    DEFAULT_LINK_TITLE, EMPTY_REPLY_TEXT,
};
pub use map::{
    MapController, MapRenderer, Marker, RecordingRenderer, RenderCall, DEFAULT_ZOOM,
};
pub use message::{Conversation, ConversationMessage, GroundingLink, Role};
pub use model::{
    ChunkSource, GeminiClient, GroundingChunk, MockModel, ModelClient, ModelError, ModelRequest,
    ModelResponse, ToolCapability, Turn, DEFAULT_GEMINI_BASE_URL, DEFAULT_MODEL,
};
pub use prompts::SAFORA_SYSTEM_INSTRUCTION;
pub use session::{
    SessionError, SessionSnapshot, SubmitState, TravelSession, TurnOutcome,
    DEFAULT_REQUEST_TIMEOUT, FALLBACK_REPLY,
};
