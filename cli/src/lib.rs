//! Safora CLI library: session construction, reply formatting and the text map view.
//!
//! The `safora` binary (`main.rs`) parses arguments, loads config and logging, then
//! drives a [`CliSession`] one turn at a time, printing each reply and the map.

pub mod display;
pub mod session_builder;
pub mod terminal_map;

pub use display::{format_link, format_reply, render_json, truncate_display, turn_json};
pub use session_builder::{build_client, build_session, BuildError, CliSession, SessionOptions};
pub use terminal_map::{format_marker, TextMapRenderer};
