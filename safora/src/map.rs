//! Map controller: sole owner of the map renderer and its marker set.
//!
//! The renderer itself (tiles, easing, popups) is opaque behind [`MapRenderer`].
//! [`MapController`] is built once, passed by `&mut` to whoever updates the map and torn
//! down with [`MapController::dispose`], which consumes it.

use serde::Serialize;

use crate::destination::Destination;
use crate::geo::Coordinates;

/// Zoom level used for the initial view and every recenter.
pub const DEFAULT_ZOOM: u8 = 14;

/// One plotted point with its popup content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub label: String,
    pub description: String,
    pub coordinates: Coordinates,
}

impl From<&Destination> for Marker {
    fn from(d: &Destination) -> Self {
        Self {
            id: d.id.clone(),
            label: d.name.clone(),
            description: d.description.clone(),
            coordinates: d.coordinates,
        }
    }
}

/// Drawing backend for the map view.
pub trait MapRenderer: Send {
    /// Moves the view to `center` (smooth transition is up to the renderer).
    fn fly_to(&mut self, center: Coordinates, zoom: u8);

    /// Removes every existing marker and draws `markers`.
    fn replace_markers(&mut self, markers: &[Marker]);

    /// Releases renderer resources.
    fn teardown(&mut self);
}

/// Owns a renderer, the current center and the marker set.
pub struct MapController<R: MapRenderer> {
    renderer: R,
    center: Coordinates,
    markers: Vec<Marker>,
}

impl<R: MapRenderer> MapController<R> {
    /// Initializes the view at `center`.
    pub fn new(mut renderer: R, center: Coordinates) -> Self {
        renderer.fly_to(center, DEFAULT_ZOOM);
        Self {
            renderer,
            center,
            markers: Vec::new(),
        }
    }

    pub fn center(&self) -> Coordinates {
        self.center
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Recenters; a no-op when already there.
    pub fn set_center(&mut self, center: Coordinates) {
        if center == self.center {
            return;
        }
        self.center = center;
        self.renderer.fly_to(center, DEFAULT_ZOOM);
    }

    /// Replaces the whole marker set with one marker per destination.
    pub fn set_markers(&mut self, destinations: &[Destination]) {
        self.markers = destinations.iter().map(Marker::from).collect();
        self.renderer.replace_markers(&self.markers);
    }

    /// Tears the renderer down and hands it back.
    pub fn dispose(mut self) -> R {
        self.markers.clear();
        self.renderer.teardown();
        self.renderer
    }
}

/// Renderer call, as recorded by [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    FlyTo(Coordinates, u8),
    ReplaceMarkers(Vec<String>),
    Teardown,
}

/// Renderer that records calls instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<RenderCall>,
}

impl MapRenderer for RecordingRenderer {
    fn fly_to(&mut self, center: Coordinates, zoom: u8) {
        self.calls.push(RenderCall::FlyTo(center, zoom));
    }

    fn replace_markers(&mut self, markers: &[Marker]) {
        self.calls.push(RenderCall::ReplaceMarkers(
            markers.iter().map(|m| m.id.clone()).collect(),
        ));
    }

    fn teardown(&mut self) {
        self.calls.push(RenderCall::Teardown);
    }
}
