//! Conversation types: roles, messages, grounding links.
//!
//! A [`Conversation`] is append-only: messages are pushed in order and never edited
//! or removed. Assistant messages carry the [`GroundingLink`]s the model cited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Role tag in the model request (`"user"` or `"model"`).
    pub fn wire_name(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "model",
        }
    }
}

/// A citation the model returned, with coordinates when the URI encodes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingLink {
    pub title: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// One message in the chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grounding_links: Vec<GroundingLink>,
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    /// User message stamped now.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            grounding_links: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Assistant message stamped now.
    pub fn assistant(text: impl Into<String>, grounding_links: Vec<GroundingLink>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            grounding_links,
            timestamp: Utc::now(),
        }
    }

    /// `HH:MM` in UTC, as shown under a chat bubble.
    pub fn display_time(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }

    /// Links that can be located on the map.
    pub fn locatable_links(&self) -> impl Iterator<Item = &GroundingLink> {
        self.grounding_links
            .iter()
            .filter(|l| l.coordinates.is_some())
    }
}

/// Append-only ordered message sequence.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Conversation {
    messages: Vec<ConversationMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ConversationMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    /// Last assistant message, if any.
    pub fn last_reply(&self) -> Option<&ConversationMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn wire_names_map_assistant_to_model() {
        assert_eq!(Role::User.wire_name(), "user");
        assert_eq!(Role::Assistant.wire_name(), "model");
    }

    #[test]
    fn conversation_is_ordered_and_append_only() {
        let mut conv = Conversation::new();
        assert!(conv.is_empty());
        conv.push(ConversationMessage::user("hi"));
        conv.push(ConversationMessage::assistant("hello", vec![]));
        conv.push(ConversationMessage::user("again"));
        let texts: Vec<_> = conv.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["hi", "hello", "again"]);
        assert_eq!(conv.last_reply().map(|m| m.text.as_str()), Some("hello"));
        assert_eq!(conv.last().map(|m| m.role), Some(Role::User));
    }

    #[test]
    fn display_time_is_hour_minute() {
        let mut msg = ConversationMessage::user("x");
        msg.timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 9, 7, 30).unwrap();
        assert_eq!(msg.display_time(), "09:07");
    }

    #[test]
    fn locatable_links_skip_links_without_coordinates() {
        let msg = ConversationMessage::assistant(
            "two places",
            vec![
                GroundingLink {
                    title: "Blog".into(),
                    uri: "https://example.com".into(),
                    coordinates: None,
                },
                GroundingLink {
                    title: "Oia".into(),
                    uri: "https://maps.google.com/@36.4618,25.3753".into(),
                    coordinates: Some(Coordinates::new(36.4618, 25.3753)),
                },
            ],
        );
        let titles: Vec<_> = msg.locatable_links().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Oia"]);
    }

    #[test]
    fn link_without_coordinates_serializes_without_field() {
        let link = GroundingLink {
            title: "Blog".into(),
            uri: "https://example.com".into(),
            coordinates: None,
        };
        let v = serde_json::to_value(&link).unwrap();
        assert!(v.get("coordinates").is_none());
    }
}
