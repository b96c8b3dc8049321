//! Geocoding and routing HTTP client.
//!
//! Two endpoints back the itinerary helper: a place-search endpoint that
//! resolves free-form names to coordinates, and a routing endpoint that
//! computes a driving path between two coordinate pairs. Geocoding
//! results are cached (place names are stable) and requests are paced to
//! stay inside the geocoding provider's rate limit.

use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::domain::Coordinates;
use crate::error::TransportFailure;

/// Provider tag for place-search failures.
pub const GEOCODING_PROVIDER: &str = "geocoding-provider";
/// Provider tag for routing failures.
pub const ROUTING_PROVIDER: &str = "routing-provider";

/// Default base URL for the place-search endpoint.
const DEFAULT_GEOCODE_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default base URL for the routing endpoint.
const DEFAULT_ROUTE_BASE_URL: &str = "https://router.project-osrm.org";

/// Configuration for the geocoding/routing client.
#[derive(Debug, Clone)]
pub struct GeoConfig {
    /// Base URL of the place-search endpoint.
    pub geocode_base_url: String,
    /// Base URL of the routing endpoint.
    pub route_base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Geocoding cache TTL in hours (0 effectively disables it).
    pub cache_ttl_hours: u64,
    /// Minimum spacing between geocoding requests, in milliseconds.
    pub min_request_interval_ms: u64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            geocode_base_url: DEFAULT_GEOCODE_BASE_URL.to_string(),
            route_base_url: DEFAULT_ROUTE_BASE_URL.to_string(),
            timeout_secs: 10,
            cache_ttl_hours: 24,
            min_request_interval_ms: 1100,
        }
    }
}

impl GeoConfig {
    /// A configuration suitable for tests: no pacing, no caching.
    pub fn for_testing(geocode_base_url: &str, route_base_url: &str) -> Self {
        Self {
            geocode_base_url: geocode_base_url.to_string(),
            route_base_url: route_base_url.to_string(),
            timeout_secs: 5,
            cache_ttl_hours: 0,
            min_request_interval_ms: 0,
        }
    }
}

/// One routed segment between two resolved points.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub geometry: Vec<Coordinates>,
}

/// Client for the place-search and routing endpoints.
#[derive(Debug)]
pub struct GeoClient {
    http: reqwest::Client,
    config: GeoConfig,
    cache: Cache<String, Coordinates>,
    last_request: Mutex<Instant>,
}

impl GeoClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GeoConfig) -> Result<Self, TransportFailure> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("transport-search/0.1")
            .build()
            .map_err(|e| TransportFailure::from_transport(e, GEOCODING_PROVIDER))?;

        let ttl = if config.cache_ttl_hours > 0 {
            Duration::from_secs(config.cache_ttl_hours * 3600)
        } else {
            Duration::from_millis(1)
        };
        let cache = Cache::builder().max_capacity(1000).time_to_live(ttl).build();

        Ok(Self {
            http,
            cache,
            last_request: Mutex::new(Instant::now() - Duration::from_secs(2)),
            config,
        })
    }

    /// Space geocoding requests at least `min_request_interval_ms` apart.
    async fn pace(&self) {
        let interval = Duration::from_millis(self.config.min_request_interval_ms);
        if interval.is_zero() {
            return;
        }
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < interval {
            tokio::time::sleep(interval - elapsed).await;
        }
        *last = Instant::now();
    }

    /// Resolve a place name to coordinates via the place-search endpoint.
    #[instrument(skip(self))]
    pub async fn resolve_place(&self, name: &str) -> Result<Coordinates, TransportFailure> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TransportFailure::validation(format!(
                "no coordinates found for place: {name}"
            )));
        }

        let cache_key = name.to_lowercase();
        if let Some(coords) = self.cache.get(&cache_key).await {
            debug!(%name, "geocoding cache hit");
            return Ok(coords);
        }

        self.pace().await;

        let url = format!("{}/search", self.config.geocode_base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("q", name), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| TransportFailure::from_transport(e, GEOCODING_PROVIDER))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportFailure::api_status(
                status.as_u16(),
                GEOCODING_PROVIDER,
                None,
            ));
        }

        let results: Vec<RawPlace> = response
            .json()
            .await
            .map_err(|e| TransportFailure::from_transport(e, GEOCODING_PROVIDER))?;

        let place = results.first().ok_or_else(|| {
            TransportFailure::validation(format!("no coordinates found for place: {name}"))
        })?;

        let coords = Coordinates::new(
            place.lat.parse().map_err(|_| {
                TransportFailure::unknown("invalid latitude in place result", GEOCODING_PROVIDER)
            })?,
            place.lon.parse().map_err(|_| {
                TransportFailure::unknown("invalid longitude in place result", GEOCODING_PROVIDER)
            })?,
        );

        self.cache.insert(cache_key, coords).await;
        debug!(%name, lat = coords.lat, lon = coords.lon, "resolved place");
        Ok(coords)
    }

    /// Compute a driving route between two points via the routing
    /// endpoint, with full geometry.
    #[instrument(skip(self))]
    pub async fn route_between(
        &self,
        from: Coordinates,
        to: Coordinates,
    ) -> Result<RouteLeg, TransportFailure> {
        // Routing endpoints take lon,lat pairs.
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.config.route_base_url, from.lon, from.lat, to.lon, to.lat
        );

        let response = self
            .http
            .get(&url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await
            .map_err(|e| TransportFailure::from_transport(e, ROUTING_PROVIDER))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportFailure::api_status(
                status.as_u16(),
                ROUTING_PROVIDER,
                None,
            ));
        }

        let body: RawRouteResponse = response
            .json()
            .await
            .map_err(|e| TransportFailure::from_transport(e, ROUTING_PROVIDER))?;

        let route = body
            .routes
            .first()
            .ok_or_else(|| TransportFailure::unknown("unable to compute route", ROUTING_PROVIDER))?;

        let geometry = route
            .geometry
            .as_ref()
            .map(|g| {
                g.coordinates
                    .iter()
                    .map(|pair| Coordinates::new(pair[1], pair[0]))
                    .collect()
            })
            .unwrap_or_default();

        debug!(
            distance = route.distance,
            duration = route.duration,
            "computed route segment"
        );

        Ok(RouteLeg {
            distance_meters: route.distance,
            duration_seconds: route.duration,
            geometry,
        })
    }
}

// --- Raw endpoint response shapes ---

#[derive(Debug, Deserialize)]
struct RawPlace {
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct RawRouteResponse {
    #[serde(default)]
    routes: Vec<RawRoute>,
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    distance: f64,
    duration: f64,
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    /// GeoJSON LineString coordinates: `[lon, lat]` pairs.
    coordinates: Vec<[f64; 2]>,
}
