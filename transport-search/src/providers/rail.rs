//! Rail provider adapter.
//!
//! Issues journey queries against the rail provider's API and normalizes
//! its response shape (top-level `journeys` collection, compact
//! `YYYYMMDDTHHMMSS` timestamps, lenient transfer counts) into canonical
//! results.

use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::duration::duration_between;
use crate::domain::{Price, SearchParams, StopTime, TransportMode, TransportResult, TripDetails};
use crate::error::TransportFailure;

use super::{RAIL_PROVIDER, TransportProvider};

/// Default base URL for the rail journeys API.
const DEFAULT_BASE_URL: &str = "https://api.sncf.com/v1/coverage/sncf";

/// Compact timestamp format used by the rail provider.
const RAIL_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Maximum journeys requested per search.
const RESULT_CAP: u8 = 10;

/// Configuration for the rail client.
#[derive(Debug, Clone)]
pub struct RailConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl RailConfig {
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

/// Rail journeys API client.
#[derive(Debug, Clone)]
pub struct RailClient {
    http: reqwest::Client,
    base_url: String,
}

impl RailClient {
    /// Create a new rail client with the given configuration.
    pub fn new(config: RailConfig) -> Result<Self, TransportFailure> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| TransportFailure::validation("invalid rail API key format"))?;
        headers.insert(HeaderName::from_static("x-apikey"), api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportFailure::from_transport(e, RAIL_PROVIDER))?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    async fn fetch(&self, params: &SearchParams) -> Result<RawRailResponse, TransportFailure> {
        let url = format!("{}/journeys", self.base_url);

        debug!(from = %params.departure, to = %params.arrival, "querying rail journeys");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("from", params.departure.clone()),
                ("to", params.arrival.clone()),
                ("datetime", rail_datetime(&params.date)),
                ("count", RESULT_CAP.to_string()),
            ])
            .send()
            .await
            .map_err(|e| TransportFailure::from_transport(e, RAIL_PROVIDER))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportFailure::api_status(
                status.as_u16(),
                RAIL_PROVIDER,
                (!body.is_empty()).then_some(body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| TransportFailure::from_transport(e, RAIL_PROVIDER))
    }
}

#[async_trait::async_trait]
impl TransportProvider for RailClient {
    fn name(&self) -> &'static str {
        RAIL_PROVIDER
    }

    async fn search(
        &self,
        params: &SearchParams,
    ) -> Result<Vec<TransportResult>, TransportFailure> {
        let raw = self.fetch(params).await?;
        normalize(raw, params)
    }
}

/// Render the caller's date in the provider's compact datetime format.
///
/// Dates already in compact form pass through; "YYYY-MM-DD" gains a
/// midnight time component; anything else is forwarded as-is and left for
/// the provider to reject.
fn rail_datetime(date: &str) -> String {
    if date.contains('T') {
        return date.to_string();
    }
    format!("{}T000000", date.replace('-', ""))
}

/// Normalize the rail response shape into canonical results.
///
/// Requires a `journeys` collection. Individually malformed journeys are
/// skipped with a warning rather than failing the whole list.
fn normalize(
    raw: RawRailResponse,
    params: &SearchParams,
) -> Result<Vec<TransportResult>, TransportFailure> {
    let journeys = raw
        .journeys
        .ok_or_else(|| TransportFailure::validation("invalid rail response shape"))?;

    let mut results = Vec::with_capacity(journeys.len());
    for (idx, journey) in journeys.iter().enumerate() {
        match normalize_journey(journey, idx, params) {
            Ok(result) => results.push(result),
            Err(reason) => warn!(idx, %reason, "skipping malformed rail journey"),
        }
    }
    Ok(results)
}

/// Convert a single raw journey. Returns a human-readable skip reason on
/// malformed entries.
fn normalize_journey(
    journey: &RawJourney,
    idx: usize,
    params: &SearchParams,
) -> Result<TransportResult, String> {
    let departure = parse_rail_timestamp(journey.departure_date_time.as_deref())
        .ok_or("unparseable departure timestamp")?;
    let arrival = parse_rail_timestamp(journey.arrival_date_time.as_deref())
        .ok_or("unparseable arrival timestamp")?;

    // Missing or non-numeric transfer counts normalize to 0 by policy.
    let stops = journey
        .nb_transfers
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0) as u32;

    let sections = journey.sections.as_deref().unwrap_or(&[]);
    let departure_station = sections
        .first()
        .and_then(|s| s.from.as_ref())
        .map(|p| p.name.clone())
        .unwrap_or_else(|| params.departure.clone());
    let arrival_station = sections
        .last()
        .and_then(|s| s.to.as_ref())
        .map(|p| p.name.clone())
        .unwrap_or_else(|| params.arrival.clone());

    let info = sections.iter().find_map(|s| s.display_informations.as_ref());
    let number = info
        .and_then(|i| i.headsign.clone())
        .unwrap_or_else(|| format!("R{idx}"));
    let operator = info
        .and_then(|i| i.network.clone())
        .unwrap_or_else(|| "rail".to_string());

    let price = journey
        .fare
        .as_ref()
        .and_then(|f| f.total.as_ref())
        .map_or(
            Price {
                amount: 0.0,
                currency: "EUR".to_string(),
            },
            |total| Price {
                amount: total.value.parse().unwrap_or(0.0),
                currency: total.currency.clone().unwrap_or_else(|| "EUR".to_string()),
            },
        );

    Ok(TransportResult {
        id: format!("rail-{idx}"),
        mode: TransportMode::Rail,
        provider: RAIL_PROVIDER.to_string(),
        departure: StopTime {
            station: departure_station,
            time: departure.format("%H:%M").to_string(),
            date: departure.format("%Y-%m-%d").to_string(),
        },
        arrival: StopTime {
            station: arrival_station,
            time: arrival.format("%H:%M").to_string(),
            date: arrival.format("%Y-%m-%d").to_string(),
        },
        duration: duration_between(departure, arrival),
        price,
        details: TripDetails {
            stops,
            class: None,
            number,
            operator,
            booking_url: None,
        },
    })
}

fn parse_rail_timestamp(value: Option<&str>) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value?, RAIL_DATETIME_FORMAT).ok()
}

// --- Raw response shape (provider-owned schema A) ---

#[derive(Debug, Deserialize)]
struct RawRailResponse {
    journeys: Option<Vec<RawJourney>>,
}

#[derive(Debug, Deserialize)]
struct RawJourney {
    departure_date_time: Option<String>,
    arrival_date_time: Option<String>,
    /// Deliberately untyped: missing or non-numeric values default to 0.
    nb_transfers: Option<serde_json::Value>,
    fare: Option<RawFare>,
    sections: Option<Vec<RawSection>>,
}

#[derive(Debug, Deserialize)]
struct RawFare {
    total: Option<RawCost>,
}

#[derive(Debug, Deserialize)]
struct RawCost {
    value: String,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    from: Option<RawPlace>,
    to: Option<RawPlace>,
    display_informations: Option<RawDisplayInfo>,
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawDisplayInfo {
    headsign: Option<String>,
    network: Option<String>,
}
