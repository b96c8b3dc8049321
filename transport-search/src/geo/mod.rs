//! Geocoding and routing helper for itinerary rendering.

mod client;
mod itinerary;

pub use client::{GEOCODING_PROVIDER, GeoClient, GeoConfig, ROUTING_PROVIDER, RouteLeg};
