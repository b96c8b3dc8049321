//! Routed itinerary types.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Role of a point within an itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Departure,
    Arrival,
    Stop,
}

/// A resolved place within an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    pub kind: PointKind,
}

impl RoutePoint {
    pub fn new(coords: Coordinates, name: impl Into<String>, kind: PointKind) -> Self {
        Self {
            lat: coords.lat,
            lon: coords.lon,
            name: name.into(),
            kind,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// A complete routed itinerary.
///
/// `points` always has at least two entries: the first is the departure,
/// the last the arrival, interior points are stops. Distance and duration
/// are sums over the consecutive-point segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub points: Vec<RoutePoint>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// Concatenated segment polyline, for map rendering.
    pub geometry: Vec<Coordinates>,
}
