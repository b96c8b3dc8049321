//! Air provider adapter.
//!
//! The air provider requires a bearer token from a client-credentials
//! exchange (see [`TokenCache`]) before each offer query. Its response
//! shape is a top-level `data` collection of offers, each carrying one or
//! more itineraries of flight segments. Only the first itinerary and its
//! first segment are surfaced (single-leg simplification); the transfer
//! count still reflects the full first itinerary.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::duration::duration_between;
use crate::domain::{Price, SearchParams, StopTime, TransportMode, TransportResult, TripDetails};
use crate::error::TransportFailure;

use super::{AIR_PROVIDER, TokenCache, TransportProvider};

/// Default base URL for the air offers API.
const DEFAULT_BASE_URL: &str = "https://api.amadeus.test/v2";

/// Timestamp format used in segment departure/arrival `at` fields.
const AIR_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Maximum offers requested per search.
const RESULT_CAP: u8 = 10;

/// Configuration for the air client.
#[derive(Debug, Clone)]
pub struct AirConfig {
    /// OAuth2 client id.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// Base URL for the offers API.
    pub base_url: String,
    /// URL of the token exchange endpoint.
    pub token_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl AirConfig {
    /// Create a new config with the given client credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            token_url: format!("{DEFAULT_BASE_URL}/security/oauth2/token"),
            timeout_secs: 30,
        }
    }

    /// Set a custom offers base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set a custom token endpoint URL (for testing).
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Build the token cache for this configuration. Construct it once
    /// per process and share it across every air client.
    pub fn token_cache(&self) -> Result<TokenCache, TransportFailure> {
        TokenCache::new(
            self.token_url.clone(),
            self.client_id.clone(),
            self.client_secret.clone(),
            self.timeout_secs,
        )
    }
}

/// Air offers API client.
#[derive(Debug, Clone)]
pub struct AirClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenCache>,
}

impl AirClient {
    /// Create a new air client sharing the given token cache.
    pub fn new(config: AirConfig, tokens: Arc<TokenCache>) -> Result<Self, TransportFailure> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportFailure::from_transport(e, AIR_PROVIDER))?;

        Ok(Self {
            http,
            base_url: config.base_url,
            tokens,
        })
    }

    async fn fetch(&self, params: &SearchParams) -> Result<RawAirResponse, TransportFailure> {
        let token = self.tokens.bearer_token().await?;
        let url = format!("{}/shopping/flight-offers", self.base_url);

        debug!(origin = %params.departure, destination = %params.arrival, "querying air offers");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .query(&[
                ("origin", params.departure.clone()),
                ("destination", params.arrival.clone()),
                ("date", params.date.clone()),
                ("adults", params.passengers.to_string()),
                ("max", RESULT_CAP.to_string()),
            ])
            .send()
            .await
            .map_err(|e| TransportFailure::from_transport(e, AIR_PROVIDER))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportFailure::api_status(
                status.as_u16(),
                AIR_PROVIDER,
                (!body.is_empty()).then_some(body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| TransportFailure::from_transport(e, AIR_PROVIDER))
    }
}

#[async_trait::async_trait]
impl TransportProvider for AirClient {
    fn name(&self) -> &'static str {
        AIR_PROVIDER
    }

    async fn search(
        &self,
        params: &SearchParams,
    ) -> Result<Vec<TransportResult>, TransportFailure> {
        let raw = self.fetch(params).await?;
        normalize(raw)
    }
}

/// Normalize the air response shape into canonical results.
///
/// Requires a `data` collection. Offers without itineraries or segments
/// are skipped with a warning.
fn normalize(raw: RawAirResponse) -> Result<Vec<TransportResult>, TransportFailure> {
    let offers = raw
        .data
        .ok_or_else(|| TransportFailure::validation("invalid air response shape"))?;

    let mut results = Vec::with_capacity(offers.len());
    for (idx, offer) in offers.iter().enumerate() {
        match normalize_offer(offer, idx) {
            Ok(result) => results.push(result),
            Err(reason) => warn!(idx, %reason, "skipping malformed air offer"),
        }
    }
    Ok(results)
}

fn normalize_offer(offer: &RawOffer, idx: usize) -> Result<TransportResult, String> {
    // Single-leg simplification: surface only the first itinerary and its
    // first segment; stops still count the whole first itinerary.
    let itinerary = offer.itineraries.first().ok_or("offer has no itineraries")?;
    let segment = itinerary.segments.first().ok_or("itinerary has no segments")?;
    let stops = (itinerary.segments.len() as u32).saturating_sub(1);

    let departure = parse_air_timestamp(segment.departure.at.as_deref())
        .ok_or("unparseable departure timestamp")?;
    let arrival =
        parse_air_timestamp(segment.arrival.at.as_deref()).ok_or("unparseable arrival timestamp")?;

    let carrier = segment.carrier_code.clone().unwrap_or_default();
    let number = match (&segment.carrier_code, &segment.number) {
        (Some(c), Some(n)) => format!("{c} {n}"),
        (None, Some(n)) => n.clone(),
        _ => format!("A{idx}"),
    };

    let price = offer.price.as_ref().map_or(
        Price {
            amount: 0.0,
            currency: "EUR".to_string(),
        },
        |p| Price {
            amount: p.total.as_deref().and_then(|t| t.parse().ok()).unwrap_or(0.0),
            currency: p.currency.clone().unwrap_or_else(|| "EUR".to_string()),
        },
    );

    Ok(TransportResult {
        id: offer.id.clone().unwrap_or_else(|| format!("air-{idx}")),
        mode: TransportMode::Air,
        provider: AIR_PROVIDER.to_string(),
        departure: StopTime {
            station: segment.departure.iata_code.clone().unwrap_or_default(),
            time: departure.format("%H:%M").to_string(),
            date: departure.format("%Y-%m-%d").to_string(),
        },
        arrival: StopTime {
            station: segment.arrival.iata_code.clone().unwrap_or_default(),
            time: arrival.format("%H:%M").to_string(),
            date: arrival.format("%Y-%m-%d").to_string(),
        },
        duration: duration_between(departure, arrival),
        price,
        details: TripDetails {
            stops,
            class: offer.cabin.clone(),
            number,
            operator: carrier,
            booking_url: None,
        },
    })
}

fn parse_air_timestamp(value: Option<&str>) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value?, AIR_DATETIME_FORMAT).ok()
}

// --- Raw response shape (provider-owned schema B) ---

#[derive(Debug, Deserialize)]
struct RawAirResponse {
    data: Option<Vec<RawOffer>>,
}

#[derive(Debug, Deserialize)]
struct RawOffer {
    id: Option<String>,
    #[serde(default)]
    itineraries: Vec<RawItinerary>,
    price: Option<RawPrice>,
    cabin: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawItinerary {
    #[serde(default)]
    segments: Vec<RawSegment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSegment {
    departure: RawFlightPoint,
    arrival: RawFlightPoint,
    carrier_code: Option<String>,
    number: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFlightPoint {
    iata_code: Option<String>,
    at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    total: Option<String>,
    currency: Option<String>,
}
