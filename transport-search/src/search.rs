//! Aggregation facade.
//!
//! Validates caller parameters, dispatches to exactly one provider
//! adapter via a lookup table keyed on [`TransportMode`], and guarantees
//! that every outcome is either a complete canonical result list or a
//! typed [`TransportFailure`].

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::{SearchParams, TransportMode, TransportResult};
use crate::error::TransportFailure;
use crate::providers::{
    AirClient, AirConfig, CoachClient, CoachConfig, RailClient, RailConfig, TransportProvider,
};

/// The transport search facade.
///
/// Holds one adapter per registered mode. Adapters are trait objects so
/// each provider's quirks stay isolated behind
/// [`TransportProvider::search`].
#[derive(Default)]
pub struct TransportSearch {
    providers: HashMap<TransportMode, Arc<dyn TransportProvider>>,
}

impl TransportSearch {
    /// An empty facade with no registered adapters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire up all three standard adapters from their configurations.
    /// The air token cache is constructed once here and shared.
    pub fn from_configs(
        rail: RailConfig,
        air: AirConfig,
        coach: CoachConfig,
    ) -> Result<Self, TransportFailure> {
        let tokens = Arc::new(air.token_cache()?);
        Ok(Self::new()
            .with_provider(TransportMode::Rail, Arc::new(RailClient::new(rail)?))
            .with_provider(TransportMode::Air, Arc::new(AirClient::new(air, tokens)?))
            .with_provider(TransportMode::Coach, Arc::new(CoachClient::new(coach)?)))
    }

    /// Register (or replace) the adapter serving `mode`.
    pub fn with_provider(mut self, mode: TransportMode, provider: Arc<dyn TransportProvider>) -> Self {
        self.providers.insert(mode, provider);
        self
    }

    /// Search transport options for the given parameters.
    ///
    /// Validates the parameters, then dispatches to the adapter
    /// registered for `params.mode`. Adapter failures propagate
    /// unchanged; they are already typed at the adapter seam.
    #[instrument(skip(self), fields(mode = %params.mode))]
    pub async fn search_transports(
        &self,
        params: &SearchParams,
    ) -> Result<Vec<TransportResult>, TransportFailure> {
        validate(params)?;

        let provider = self.providers.get(&params.mode).ok_or_else(|| {
            TransportFailure::validation(format!("unsupported transport mode: {}", params.mode))
        })?;

        let results = provider.search(params).await?;
        debug!(provider = provider.name(), count = results.len(), "search complete");
        Ok(results)
    }
}

impl std::fmt::Debug for TransportSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportSearch")
            .field("modes", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn validate(params: &SearchParams) -> Result<(), TransportFailure> {
    if params.departure.trim().is_empty()
        || params.arrival.trim().is_empty()
        || params.date.trim().is_empty()
    {
        return Err(TransportFailure::validation("incomplete search parameters"));
    }

    if params.passengers < 1 {
        return Err(TransportFailure::validation(
            "passenger count must be positive",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Price, StopTime, TripDetails};
    use crate::error::FailureKind;

    /// Adapter stub returning a fixed canonical result.
    struct FixedProvider {
        mode: TransportMode,
    }

    #[async_trait::async_trait]
    impl TransportProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed-provider"
        }

        async fn search(
            &self,
            params: &SearchParams,
        ) -> Result<Vec<TransportResult>, TransportFailure> {
            Ok(vec![TransportResult {
                id: "fixed-0".into(),
                mode: self.mode,
                provider: self.name().into(),
                departure: StopTime {
                    station: params.departure.clone(),
                    time: "10:00".into(),
                    date: params.date.clone(),
                },
                arrival: StopTime {
                    station: params.arrival.clone(),
                    time: "12:00".into(),
                    date: params.date.clone(),
                },
                duration: "2h00m".into(),
                price: Price {
                    amount: 10.0,
                    currency: "EUR".into(),
                },
                details: TripDetails {
                    stops: 0,
                    class: None,
                    number: "X1".into(),
                    operator: "fixed".into(),
                    booking_url: None,
                },
            }])
        }
    }

    /// Adapter stub failing with a typed upstream error.
    struct FailingProvider;

    #[async_trait::async_trait]
    impl TransportProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing-provider"
        }

        async fn search(
            &self,
            _params: &SearchParams,
        ) -> Result<Vec<TransportResult>, TransportFailure> {
            Err(TransportFailure::api_status(503, self.name(), None))
        }
    }

    fn facade() -> TransportSearch {
        TransportSearch::new().with_provider(
            TransportMode::Rail,
            Arc::new(FixedProvider {
                mode: TransportMode::Rail,
            }),
        )
    }

    fn rail_params() -> SearchParams {
        SearchParams::new("Paris", "Lyon", "2024-03-15", 1, TransportMode::Rail)
    }

    #[tokio::test]
    async fn dispatches_to_registered_provider() {
        let results = facade().search_transports(&rail_params()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].mode, TransportMode::Rail);
        assert_eq!(results[0].departure.station, "Paris");
    }

    #[tokio::test]
    async fn empty_departure_is_validation_failure() {
        let mut params = rail_params();
        params.departure = String::new();
        let err = facade().search_transports(&params).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Validation);
        assert_eq!(err.to_string(), "incomplete search parameters");
    }

    #[tokio::test]
    async fn empty_arrival_is_validation_failure() {
        let mut params = rail_params();
        params.arrival = "  ".into();
        let err = facade().search_transports(&params).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Validation);
    }

    #[tokio::test]
    async fn empty_date_is_validation_failure() {
        let mut params = rail_params();
        params.date = String::new();
        let err = facade().search_transports(&params).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Validation);
        assert_eq!(err.to_string(), "incomplete search parameters");
    }

    #[tokio::test]
    async fn zero_passengers_is_validation_failure() {
        let mut params = rail_params();
        params.passengers = 0;
        let err = facade().search_transports(&params).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Validation);
        assert!(err.to_string().contains("passenger count"));
    }

    #[tokio::test]
    async fn unregistered_mode_is_validation_failure() {
        let mut params = rail_params();
        params.mode = TransportMode::Air;
        let err = facade().search_transports(&params).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Validation);
        assert_eq!(err.to_string(), "unsupported transport mode: air");
    }

    #[tokio::test]
    async fn provider_failure_propagates_unchanged() {
        let facade = TransportSearch::new()
            .with_provider(TransportMode::Coach, Arc::new(FailingProvider));
        let mut params = rail_params();
        params.mode = TransportMode::Coach;

        let err = facade.search_transports(&params).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::UpstreamApi);
        assert_eq!(err.to_string(), "503 error from failing-provider");
        assert_eq!(err.provider(), Some("failing-provider"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Any parameter set with a blank field fails validation
            /// before dispatch, regardless of the other values.
            #[test]
            fn blank_field_always_fails(passengers in 0u32..5, blank in 0usize..3) {
                let mut params = rail_params();
                params.passengers = passengers;
                match blank {
                    0 => params.departure = String::new(),
                    1 => params.arrival = String::new(),
                    _ => params.date = String::new(),
                }
                prop_assert_eq!(
                    validate(&params).unwrap_err().kind(),
                    FailureKind::Validation
                );
            }

            /// Well-formed fields with at least one passenger always pass.
            #[test]
            fn positive_passengers_pass(passengers in 1u32..500) {
                let mut params = rail_params();
                params.passengers = passengers;
                prop_assert!(validate(&params).is_ok());
            }

            /// Zero passengers always fail with the passenger message.
            #[test]
            fn zero_passengers_fail(date in "[0-9]{4}-[0-9]{2}-[0-9]{2}") {
                let mut params = rail_params();
                params.date = date;
                params.passengers = 0;
                let err = validate(&params).unwrap_err();
                prop_assert!(err.to_string().contains("passenger count"));
            }
        }
    }
}
