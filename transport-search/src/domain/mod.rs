//! Canonical domain types shared by every adapter and the facade.

pub mod duration;
mod params;
mod result;
mod route;

pub use params::{SearchParams, TransportMode};
pub use result::{Price, StopTime, TransportResult, TripDetails};
pub use route::{Coordinates, PointKind, Route, RoutePoint};
