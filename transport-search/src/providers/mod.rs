//! Provider adapters.
//!
//! One adapter per transport mode. Each owns its HTTP client and
//! credentials, issues the provider-specific search request, and
//! normalizes the provider's raw response into the canonical
//! [`TransportResult`](crate::domain::TransportResult) list. Provider
//! payload schemas are treated as opaque, provider-owned shapes;
//! normalization is a pure function over them, unit-testable with fixture
//! payloads.

use async_trait::async_trait;

use crate::domain::{SearchParams, TransportResult};
use crate::error::TransportFailure;

mod air;
mod coach;
mod rail;
pub mod token;

pub use air::{AirClient, AirConfig};
pub use coach::{CoachClient, CoachConfig};
pub use rail::{RailClient, RailConfig};
pub use token::{CachedToken, TokenCache};

/// Provider id carried in results and failure tags for the rail adapter.
pub const RAIL_PROVIDER: &str = "rail-provider";
/// Provider id for the air adapter and its token exchange.
pub const AIR_PROVIDER: &str = "air-provider";
/// Provider id for the coach adapter.
pub const COACH_PROVIDER: &str = "coach-provider";

/// A transport search adapter for one provider.
#[async_trait]
pub trait TransportProvider: Send + Sync {
    /// Identifier carried in results and failure provider tags.
    fn name(&self) -> &'static str;

    /// Issue the provider-specific search and return canonical results.
    async fn search(
        &self,
        params: &SearchParams,
    ) -> Result<Vec<TransportResult>, TransportFailure>;
}
