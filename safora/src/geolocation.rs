//! One-shot user location used as a retrieval bias and initial map focus.

use async_trait::async_trait;

use crate::geo::Coordinates;

/// Supplies the user's position once per session; `None` when unavailable.
#[async_trait]
pub trait GeolocationSource: Send + Sync {
    async fn current_position(&self) -> Option<Coordinates>;
}

/// Location known up front (CLI flags, config), or none at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedLocation(pub Option<Coordinates>);

#[async_trait]
impl GeolocationSource for FixedLocation {
    async fn current_position(&self) -> Option<Coordinates> {
        self.0
    }
}
