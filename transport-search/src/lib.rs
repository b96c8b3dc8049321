//! Transport search aggregation.
//!
//! One "search transport options" capability backed by three structurally
//! different upstream providers (rail, air, coach), plus a geocoding and
//! routing helper that turns place names into a routed itinerary.
//!
//! Each provider has its own authentication scheme, request shape and
//! response schema; the adapters in [`providers`] normalize all of them
//! into the canonical [`TransportResult`](domain::TransportResult), and
//! every failure crossing the [`TransportSearch`] or
//! [`GeoClient`](geo::GeoClient) boundary is a typed
//! [`TransportFailure`](error::TransportFailure).
//!
//! # Example
//!
//! ```rust,ignore
//! use transport_search::{
//!     AirConfig, CoachConfig, RailConfig, SearchParams, TransportMode, TransportSearch,
//! };
//!
//! let search = TransportSearch::from_configs(
//!     RailConfig::new(rail_key),
//!     AirConfig::new(client_id, client_secret),
//!     CoachConfig::new(coach_key),
//! )?;
//!
//! let params = SearchParams::new("Paris", "Lyon", "2024-03-15", 2, TransportMode::Rail);
//! let results = search.search_transports(&params).await?;
//! ```

pub mod domain;
pub mod error;
pub mod geo;
pub mod providers;
pub mod search;

pub use domain::{
    Coordinates, PointKind, Price, Route, RoutePoint, SearchParams, StopTime, TransportMode,
    TransportResult, TripDetails,
};
pub use error::{FailureKind, TransportFailure};
pub use geo::{GeoClient, GeoConfig};
pub use providers::{
    AirClient, AirConfig, CoachClient, CoachConfig, RailClient, RailConfig, TokenCache,
    TransportProvider,
};
pub use search::TransportSearch;
