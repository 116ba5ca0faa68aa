//! Text renderer for the map view: prints recenters and the marker list.

use std::io::Write;

use safora::{Coordinates, MapRenderer, Marker};

/// [`MapRenderer`] that writes a plain-text view to `out`.
///
/// Write errors are logged and otherwise ignored; the map view is best effort.
pub struct TextMapRenderer<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TextMapRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            tracing::warn!(error = %e, "map output failed");
        }
    }
}

/// One marker line: `  * Oia (36.4618, 25.3753) - Safora Selected`.
pub fn format_marker(marker: &Marker) -> String {
    format!(
        "  * {} {} - {}",
        marker.label, marker.coordinates, marker.description
    )
}

impl<W: Write + Send> MapRenderer for TextMapRenderer<W> {
    fn fly_to(&mut self, center: Coordinates, zoom: u8) {
        self.emit(&format!("map: centered on {} (zoom {})", center, zoom));
    }

    fn replace_markers(&mut self, markers: &[Marker]) {
        if markers.is_empty() {
            self.emit("map: no pins");
            return;
        }
        self.emit(&format!("map: {} pin(s)", markers.len()));
        for m in markers {
            self.emit(&format_marker(m));
        }
    }

    fn teardown(&mut self) {
        let _ = self.out.flush();
    }
}
