//! Itinerary building: resolve place names, then route between them.
//!
//! A strict two-stage pipeline. Every place name is resolved to
//! coordinates before any routing request is issued; a failure in either
//! stage aborts the whole build and no partial itinerary is returned.
//! Both stages run sequentially to keep request volume to the providers
//! predictable.

use tracing::instrument;

use crate::domain::{PointKind, Route, RoutePoint};
use crate::error::TransportFailure;

use super::client::GeoClient;

/// Tag for the point at `idx` in a sequence of `len` resolved places.
fn point_kind(idx: usize, len: usize) -> PointKind {
    if idx == 0 {
        PointKind::Departure
    } else if idx == len - 1 {
        PointKind::Arrival
    } else {
        PointKind::Stop
    }
}

impl GeoClient {
    /// Build a routed itinerary from departure through the given stops to
    /// arrival, aggregating per-segment distance and duration.
    #[instrument(skip(self))]
    pub async fn build_itinerary(
        &self,
        departure: &str,
        arrival: &str,
        stops: &[String],
    ) -> Result<Route, TransportFailure> {
        let mut names: Vec<&str> = Vec::with_capacity(stops.len() + 2);
        names.push(departure);
        names.extend(stops.iter().map(String::as_str));
        names.push(arrival);

        // Stage one: resolve every place before any routing call.
        let mut points = Vec::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            let coords = self.resolve_place(name).await?;
            points.push(RoutePoint::new(coords, *name, point_kind(idx, names.len())));
        }

        // Stage two: route each consecutive pair and aggregate.
        let mut distance_meters = 0.0;
        let mut duration_seconds = 0.0;
        let mut geometry = Vec::new();
        for pair in points.windows(2) {
            let leg = self
                .route_between(pair[0].coordinates(), pair[1].coordinates())
                .await?;
            distance_meters += leg.distance_meters;
            duration_seconds += leg.duration_seconds;
            geometry.extend(leg.geometry);
        }

        Ok(Route {
            points,
            distance_meters,
            duration_seconds,
            geometry,
        })
    }
}
