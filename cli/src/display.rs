//! Reply formatting for stdout: plain text and the `--json` object.

use safora::{GroundingLink, TurnOutcome};
use serde_json::json;

/// Truncates a string to at most `max` chars; appends "..." when truncated. UTF-8 safe.
pub fn truncate_display(s: &str, max: usize) -> String {
    const SUFFIX: &str = "...";
    let suffix_len = 3;
    if max <= suffix_len {
        return s.chars().take(max).collect();
    }
    let content_max = max - suffix_len;
    if s.chars().count() <= max {
        return s.to_string();
    }
    format!(
        "{}{}",
        s.chars().take(content_max).collect::<String>(),
        SUFFIX
    )
}

/// `[n] title - uri (lat, lng)`, numbered from 1; coordinates only when known.
pub fn format_link(n: usize, link: &GroundingLink) -> String {
    match link.coordinates {
        Some(c) => format!("[{}] {} - {} {}", n, link.title, link.uri, c),
        None => format!("[{}] {} - {}", n, link.title, link.uri),
    }
}

/// Reply text (truncated when `max_reply_len > 0`), then one line per link.
pub fn format_reply(outcome: &TurnOutcome, max_reply_len: usize) -> String {
    let text = if max_reply_len == 0 {
        outcome.reply.text.clone()
    } else {
        truncate_display(&outcome.reply.text, max_reply_len)
    };
    let mut out = text;
    if !outcome.reply.grounding_links.is_empty() {
        out.push_str("\n\nSources:");
        for (i, link) in outcome.reply.grounding_links.iter().enumerate() {
            out.push('\n');
            out.push_str(&format_link(i + 1, link));
        }
    }
    out
}

/// `{reply, links, destinations, focus, failed}` for `--json`.
pub fn turn_json(outcome: &TurnOutcome) -> serde_json::Value {
    json!({
        "reply": outcome.reply.text,
        "links": outcome.reply.grounding_links,
        "destinations": outcome.destinations,
        "focus": outcome.focus,
        "failed": outcome.failed,
    })
}

/// Serializes `value` as one line, or multi-line when `pretty`.
pub fn render_json(value: &serde_json::Value, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
