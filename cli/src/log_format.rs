//! Plain-text event formatter that tags each line with the enclosing turn.
//!
//! Used by `logging::init()`: every chat turn runs in an `info_span!("turn")`, so the
//! `trace_id`, `span_id` and span name let file logs be grouped per turn.

use std::fmt;

use tracing_core::Subscriber;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::{LookupSpan, SpanRef};

/// Prefixes each line with `trace_id`, `span_id` and `span` from the current scope.
///
/// With a parent span: `TIMESTAMP trace_id=X span_id=Y span=NAME LEVEL: target: fields`;
/// without one the ids and name are omitted.
#[derive(Default)]
pub struct TextWithSpanIds {
    timer: SystemTime,
}

impl TextWithSpanIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S, N> FormatEvent<S, N> for TextWithSpanIds
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing_core::Event<'_>,
    ) -> fmt::Result {
        self.timer.format_time(&mut writer)?;
        if let Some(span) = ctx.parent_span() {
            let span_id = span.id().into_u64().to_string();
            let trace_id = span
                .scope()
                .from_root()
                .next()
                .map(|root: SpanRef<'_, S>| root.id().into_u64().to_string())
                .unwrap_or_else(|| span_id.clone());
            write!(
                writer,
                " trace_id={} span_id={} span={}",
                trace_id,
                span_id,
                span.name()
            )?;
        }

        let meta = event.metadata();
        write!(writer, " {}: {}: ", meta.level(), meta.target())?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
