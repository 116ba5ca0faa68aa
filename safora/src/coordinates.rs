//! Coordinate extraction from grounding-link URIs.
//!
//! Maps grounding citations usually encode the place in the URI itself, either as an
//! `@lat,lng` path segment or as a `query=lat,lng` parameter. [`CoordinateExtractor`]
//! holds an ordered list of [`CoordinatePattern`]s and returns the first match; new
//! encodings are added with [`CoordinateExtractor::with_pattern`].
//!
//! Everything here is pure and synchronous: a URI that matches nothing simply has no
//! coordinates, it is never an error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::geo::Coordinates;

/// One way of encoding a coordinate pair inside a URI.
pub trait CoordinatePattern: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Returns the coordinates encoded in `uri`, or `None` when this pattern does not apply.
    fn extract(&self, uri: &str) -> Option<Coordinates>;
}

// ASCII digits only: `\d` in `regex` also matches other Unicode digits, which `f64` rejects.
static AT_SEGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@(-?[0-9]+\.[0-9]+),(-?[0-9]+\.[0-9]+)").expect("valid at-segment regex")
});

static QUERY_PARAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"query=(-?[0-9]+\.[0-9]+),(-?[0-9]+\.[0-9]+)").expect("valid query-param regex")
});

/// First match of a two-group regex, both groups parsed as finite `f64`.
fn capture_pair(re: &Regex, uri: &str) -> Option<Coordinates> {
    let caps = re.captures(uri)?;
    let lat: f64 = caps.get(1)?.as_str().parse().ok()?;
    let lng: f64 = caps.get(2)?.as_str().parse().ok()?;
    if !(lat.is_finite() && lng.is_finite()) {
        return None;
    }
    Some(Coordinates { lat, lng })
}

/// `.../@48.8566,2.3522,15z` style segment.
#[derive(Debug, Default, Clone, Copy)]
pub struct AtSegmentPattern;

impl CoordinatePattern for AtSegmentPattern {
    fn name(&self) -> &str {
        "at_segment"
    }

    fn extract(&self, uri: &str) -> Option<Coordinates> {
        capture_pair(&AT_SEGMENT_RE, uri)
    }
}

/// `...?api=1&query=48.8566,2.3522` style parameter.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryParamPattern;

impl CoordinatePattern for QueryParamPattern {
    fn name(&self) -> &str {
        "query_param"
    }

    fn extract(&self, uri: &str) -> Option<Coordinates> {
        capture_pair(&QUERY_PARAM_RE, uri)
    }
}

/// Ordered list of patterns; earlier patterns win.
pub struct CoordinateExtractor {
    patterns: Vec<Box<dyn CoordinatePattern>>,
}

impl CoordinateExtractor {
    /// Extractor with no patterns; every URI yields `None`.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Appends a pattern with the lowest priority so far (builder).
    pub fn with_pattern(mut self, pattern: impl CoordinatePattern + 'static) -> Self {
        self.patterns.push(Box::new(pattern));
        self
    }

    /// Pattern names in priority order.
    pub fn pattern_names(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.name()).collect()
    }

    /// Tries each pattern in order and returns the first match.
    pub fn extract(&self, uri: &str) -> Option<Coordinates> {
        self.patterns.iter().find_map(|p| {
            let found = p.extract(uri);
            if found.is_some() {
                tracing::trace!(pattern = p.name(), uri, "coordinates matched");
            }
            found
        })
    }
}

impl Default for CoordinateExtractor {
    /// `@lat,lng` first, then `query=lat,lng`.
    fn default() -> Self {
        Self::empty()
            .with_pattern(AtSegmentPattern)
            .with_pattern(QueryParamPattern)
    }
}

impl std::fmt::Debug for CoordinateExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinateExtractor")
            .field("patterns", &self.pattern_names())
            .finish()
    }
}

static DEFAULT_EXTRACTOR: Lazy<CoordinateExtractor> = Lazy::new(CoordinateExtractor::default);

/// Extracts coordinates from `uri` with the default pattern order.
pub fn extract_coordinates(uri: &str) -> Option<Coordinates> {
    DEFAULT_EXTRACTOR.extract(uri)
}
