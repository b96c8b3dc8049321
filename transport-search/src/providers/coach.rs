//! Coach provider adapter.
//!
//! Issues trip queries against the coach provider's API. Its response
//! shape is a top-level `trips` collection with explicit
//! departure/arrival station objects and an optional list of
//! intermediate stops.

use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::duration::duration_between;
use crate::domain::{Price, SearchParams, StopTime, TransportMode, TransportResult, TripDetails};
use crate::error::TransportFailure;

use super::{COACH_PROVIDER, TransportProvider};

/// Default base URL for the coach trips API.
const DEFAULT_BASE_URL: &str = "https://api.coach.test/v1";

/// Timestamp format used in trip departure/arrival fields.
const COACH_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Configuration for the coach client.
#[derive(Debug, Clone)]
pub struct CoachConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl CoachConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Coach trips API client.
#[derive(Debug, Clone)]
pub struct CoachClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoachClient {
    /// Create a new coach client with the given configuration.
    pub fn new(config: CoachConfig) -> Result<Self, TransportFailure> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| TransportFailure::validation("invalid coach API key format"))?;
        headers.insert(HeaderName::from_static("x-api-key"), api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportFailure::from_transport(e, COACH_PROVIDER))?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    async fn fetch(&self, params: &SearchParams) -> Result<RawCoachResponse, TransportFailure> {
        let url = format!("{}/trips", self.base_url);

        debug!(from = %params.departure, to = %params.arrival, "querying coach trips");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("from", params.departure.clone()),
                ("to", params.arrival.clone()),
                ("date", params.date.clone()),
                ("passengers", params.passengers.to_string()),
            ])
            .send()
            .await
            .map_err(|e| TransportFailure::from_transport(e, COACH_PROVIDER))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportFailure::api_status(
                status.as_u16(),
                COACH_PROVIDER,
                (!body.is_empty()).then_some(body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| TransportFailure::from_transport(e, COACH_PROVIDER))
    }
}

#[async_trait::async_trait]
impl TransportProvider for CoachClient {
    fn name(&self) -> &'static str {
        COACH_PROVIDER
    }

    async fn search(
        &self,
        params: &SearchParams,
    ) -> Result<Vec<TransportResult>, TransportFailure> {
        let raw = self.fetch(params).await?;
        normalize(raw)
    }
}

/// Normalize the coach response shape into canonical results.
///
/// Requires a `trips` collection. Individually malformed trips are
/// skipped with a warning.
fn normalize(raw: RawCoachResponse) -> Result<Vec<TransportResult>, TransportFailure> {
    let trips = raw
        .trips
        .ok_or_else(|| TransportFailure::validation("invalid coach response shape"))?;

    let mut results = Vec::with_capacity(trips.len());
    for (idx, trip) in trips.iter().enumerate() {
        match normalize_trip(trip, idx) {
            Ok(result) => results.push(result),
            Err(reason) => warn!(idx, %reason, "skipping malformed coach trip"),
        }
    }
    Ok(results)
}

fn normalize_trip(trip: &RawTrip, idx: usize) -> Result<TransportResult, String> {
    let departure = parse_coach_timestamp(trip.departure.timestamp.as_deref())
        .ok_or("unparseable departure timestamp")?;
    let arrival = parse_coach_timestamp(trip.arrival.timestamp.as_deref())
        .ok_or("unparseable arrival timestamp")?;

    // Absent or non-sequence intermediate stop lists normalize to 0.
    let stops = trip
        .intermediate_stops
        .as_ref()
        .and_then(serde_json::Value::as_array)
        .map(|a| a.len() as u32)
        .unwrap_or(0);

    let price = trip.price.as_ref().map_or(
        Price {
            amount: 0.0,
            currency: "EUR".to_string(),
        },
        |p| Price {
            amount: p.amount.unwrap_or(0.0),
            currency: p.currency.clone().unwrap_or_else(|| "EUR".to_string()),
        },
    );

    Ok(TransportResult {
        id: trip.id.clone().unwrap_or_else(|| format!("coach-{idx}")),
        mode: TransportMode::Coach,
        provider: COACH_PROVIDER.to_string(),
        departure: StopTime {
            station: trip.departure.station.clone().unwrap_or_default(),
            time: departure.format("%H:%M").to_string(),
            date: departure.format("%Y-%m-%d").to_string(),
        },
        arrival: StopTime {
            station: trip.arrival.station.clone().unwrap_or_default(),
            time: arrival.format("%H:%M").to_string(),
            date: arrival.format("%Y-%m-%d").to_string(),
        },
        duration: duration_between(departure, arrival),
        price,
        details: TripDetails {
            stops,
            class: None,
            number: trip.line.clone().unwrap_or_else(|| format!("C{idx}")),
            operator: trip.operator.clone().unwrap_or_else(|| "coach".to_string()),
            booking_url: trip.booking_url.clone(),
        },
    })
}

fn parse_coach_timestamp(value: Option<&str>) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value?, COACH_DATETIME_FORMAT).ok()
}

// --- Raw response shape (provider-owned schema C) ---

#[derive(Debug, Deserialize)]
struct RawCoachResponse {
    trips: Option<Vec<RawTrip>>,
}

#[derive(Debug, Deserialize)]
struct RawTrip {
    id: Option<String>,
    departure: RawStop,
    arrival: RawStop,
    price: Option<RawTripPrice>,
    /// Deliberately untyped: absent or non-sequence values count as 0.
    intermediate_stops: Option<serde_json::Value>,
    operator: Option<String>,
    line: Option<String>,
    booking_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawStop {
    station: Option<String>,
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTripPrice {
    amount: Option<f64>,
    currency: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    fn parse(json: &str) -> RawCoachResponse {
        serde_json::from_str(json).unwrap()
    }

    const ONE_TRIP: &str = r#"{
        "trips": [{
            "id": "trip-77",
            "departure": { "station": "Paris Bercy", "timestamp": "2024-03-15T08:00:00" },
            "arrival": { "station": "Lyon Perrache", "timestamp": "2024-03-15T14:30:00" },
            "price": { "amount": 19.99, "currency": "EUR" },
            "intermediate_stops": [
                { "station": "Dijon" },
                { "station": "Mâcon" }
            ],
            "operator": "FlixBus",
            "line": "N770",
            "booking_url": "https://example.test/book/77"
        }]
    }"#;

    #[test]
    fn normalizes_one_trip() {
        let results = normalize(parse(ONE_TRIP)).unwrap();
        assert_eq!(results.len(), 1);

        let r = &results[0];
        assert_eq!(r.id, "trip-77");
        assert_eq!(r.mode, TransportMode::Coach);
        assert_eq!(r.provider, "coach-provider");
        assert_eq!(r.departure.station, "Paris Bercy");
        assert_eq!(r.arrival.station, "Lyon Perrache");
        assert_eq!(r.duration, "6h30m");
        assert_eq!(r.price.amount, 19.99);
        assert_eq!(r.details.stops, 2);
        assert_eq!(r.details.number, "N770");
        assert_eq!(r.details.operator, "FlixBus");
        assert_eq!(
            r.details.booking_url.as_deref(),
            Some("https://example.test/book/77")
        );
    }

    #[test]
    fn missing_trips_is_shape_violation() {
        let err = normalize(parse(r#"{"message": "try later"}"#)).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Validation);
        assert_eq!(err.to_string(), "invalid coach response shape");
    }

    #[test]
    fn absent_intermediate_stops_default_to_zero() {
        let json = r#"{
            "trips": [{
                "departure": { "station": "A", "timestamp": "2024-03-15T08:00:00" },
                "arrival": { "station": "B", "timestamp": "2024-03-15T09:00:00" }
            }]
        }"#;
        let results = normalize(parse(json)).unwrap();
        assert_eq!(results[0].details.stops, 0);
    }

    #[test]
    fn non_sequence_intermediate_stops_default_to_zero() {
        let json = r#"{
            "trips": [{
                "departure": { "station": "A", "timestamp": "2024-03-15T08:00:00" },
                "arrival": { "station": "B", "timestamp": "2024-03-15T09:00:00" },
                "intermediate_stops": "Dijon, Mâcon"
            }]
        }"#;
        let results = normalize(parse(json)).unwrap();
        assert_eq!(results[0].details.stops, 0);
    }

    #[test]
    fn malformed_trip_is_skipped() {
        let json = r#"{
            "trips": [
                { "departure": { "station": "A" }, "arrival": { "station": "B" } },
                {
                    "departure": { "station": "A", "timestamp": "2024-03-15T08:00:00" },
                    "arrival": { "station": "B", "timestamp": "2024-03-15T09:15:00" }
                }
            ]
        }"#;
        let results = normalize(parse(json)).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].duration, "1h15m");
    }

    #[test]
    fn empty_trips_is_empty_result() {
        let results = normalize(parse(r#"{"trips": []}"#)).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn config_defaults() {
        let config = CoachConfig::new("key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
    }
}
