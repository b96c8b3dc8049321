//! The canonical search result shape.
//!
//! All three provider adapters normalize into [`TransportResult`] so the
//! facade and every downstream consumer can treat providers
//! interchangeably. Serialized camelCase for the presentation layer.

use serde::{Deserialize, Serialize};

use super::params::TransportMode;

/// A departure or arrival: station name plus local time and date strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTime {
    pub station: String,
    /// "HH:MM" local time.
    pub time: String,
    /// "YYYY-MM-DD" local date.
    pub date: String,
}

/// Offer price. `amount` is never negative; leniently defaults to 0 when
/// the provider omits fare information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
}

/// Mode-specific extras carried alongside the canonical core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDetails {
    /// Intermediate stop / transfer count, always `>= 0`.
    pub stops: u32,
    /// Travel class, when the provider reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Train / flight / line number.
    pub number: String,
    pub operator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
}

/// One canonical transport offer, request-scoped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportResult {
    pub id: String,
    pub mode: TransportMode,
    /// Identifier of the adapter that produced this result.
    pub provider: String,
    pub departure: StopTime,
    pub arrival: StopTime,
    /// Wall-clock trip duration rendered as "HhMMm", e.g. "2h05m".
    pub duration: String,
    pub price: Price,
    pub details: TripDetails,
}
