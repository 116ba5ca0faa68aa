//! Destination deriver: map destinations from the grounding links of one response.
//!
//! Only links with coordinates become destinations. Ids are `dest-<batch_millis>-<index>`,
//! unique within one derivation but not across calls. The caller replaces its whole
//! destination list with each new batch and recenters via [`select_focus`].

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;
use crate::message::GroundingLink;

/// Description attached to every derived destination.
pub const DESTINATION_LABEL: &str = "Safora Selected";

/// A map-plottable point derived from a grounding link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub description: String,
    pub coordinates: Coordinates,
}

/// Destinations for `links` in order, stamped with `batch_millis`.
pub fn derive_destinations(links: &[GroundingLink], batch_millis: i64) -> Vec<Destination> {
    links
        .iter()
        .filter_map(|l| l.coordinates.map(|c| (l, c)))
        .enumerate()
        .map(|(i, (link, coordinates))| Destination {
            id: format!("dest-{}-{}", batch_millis, i),
            name: link.title.clone(),
            description: DESTINATION_LABEL.to_string(),
            coordinates,
        })
        .collect()
}

/// New map focus: the first destination, or `previous` when there is none.
pub fn select_focus(destinations: &[Destination], previous: Coordinates) -> Coordinates {
    destinations
        .first()
        .map(|d| d.coordinates)
        .unwrap_or(previous)
}

/// Source of batch timestamps.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// [`derive_destinations`] with a clock for the batch stamp.
pub struct DestinationDeriver {
    clock: Box<dyn Clock>,
}

impl DestinationDeriver {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
        }
    }

    pub fn derive(&self, links: &[GroundingLink]) -> Vec<Destination> {
        derive_destinations(links, self.clock.now_millis())
    }
}

impl Default for DestinationDeriver {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl std::fmt::Debug for DestinationDeriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestinationDeriver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn link(title: &str, coords: Option<(f64, f64)>) -> GroundingLink {
        GroundingLink {
            title: title.to_string(),
            uri: format!("https://example.com/{}", title),
            coordinates: coords.map(|(lat, lng)| Coordinates::new(lat, lng)),
        }
    }

    #[test]
    fn empty_links_give_no_destinations() {
        assert!(derive_destinations(&[], 1).is_empty());
    }

    #[test]
    fn only_links_with_coordinates_survive_in_order() {
        let links = vec![
            link("a", None),
            link("b", Some((1.0, 2.0))),
            link("c", None),
            link("d", Some((-3.0, 4.5))),
            link("e", Some((5.0, -6.0))),
        ];
        let dests = derive_destinations(&links, 1700000000000);
        let names: Vec<_> = dests.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["b", "d", "e"]);
        assert_eq!(dests[1].coordinates, Coordinates::new(-3.0, 4.5));
        assert!(dests.iter().all(|d| d.description == DESTINATION_LABEL));
    }

    #[test]
    fn ids_use_batch_and_filtered_index() {
        let links = vec![link("a", None), link("b", Some((1.0, 2.0))), link("c", Some((3.0, 4.0)))];
        let ids: Vec<_> = derive_destinations(&links, 42)
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["dest-42-0", "dest-42-1"]);
    }

    #[test]
    fn ids_are_pairwise_distinct() {
        let links: Vec<_> = (0..50)
            .map(|i| link(&format!("p{}", i), Some((i as f64, 0.5))))
            .collect();
        let dests = derive_destinations(&links, 7);
        let ids: HashSet<_> = dests.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn every_destination_matches_a_link_coordinate() {
        let links = vec![link("x", Some((10.0, 20.0))), link("y", Some((30.0, 40.0)))];
        for d in derive_destinations(&links, 0) {
            assert!(links.iter().any(|l| l.coordinates == Some(d.coordinates)));
        }
    }

    #[test]
    fn focus_is_first_destination_or_previous() {
        let previous = Coordinates::new(48.8566, 2.3522);
        assert_eq!(select_focus(&[], previous), previous);
        let dests = derive_destinations(
            &[link("first", Some((1.0, 1.0))), link("second", Some((2.0, 2.0)))],
            0,
        );
        assert_eq!(select_focus(&dests, previous), Coordinates::new(1.0, 1.0));
    }

    #[test]
    fn deriver_uses_its_clock() {
        let deriver = DestinationDeriver::new(FixedClock(99));
        let dests = deriver.derive(&[link("a", Some((1.0, 2.0)))]);
        assert_eq!(dests[0].id, "dest-99-0");
    }
}
