//! Failure taxonomy for the aggregation pipeline.
//!
//! Every error that crosses the facade or itinerary boundary is a
//! [`TransportFailure`] of exactly one [`FailureKind`]. Adapters raise
//! `Validation` failures for the payload shape violations they detect
//! themselves; transport-level errors are classified here.

use std::error::Error as StdError;

/// Boxed underlying cause, kept for diagnostics at the boundary.
pub type Cause = Box<dyn StdError + Send + Sync>;

/// The closed set of failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Caller-input problem; never retryable.
    Validation,
    /// The upstream API responded with an error.
    UpstreamApi,
    /// The request was sent but no response arrived.
    Network,
    /// Anything else (e.g. the request could not be constructed).
    Unknown,
}

/// A typed failure from the transport aggregation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum TransportFailure {
    /// Invalid caller input.
    #[error("{message}")]
    Validation { message: String },

    /// The upstream provider answered with an error status or unusable body.
    #[error("{message}")]
    UpstreamApi {
        message: String,
        provider: Option<String>,
        #[source]
        cause: Option<Cause>,
    },

    /// Timeout, connection reset, DNS failure: no response came back.
    #[error("{message}")]
    Network {
        message: String,
        provider: Option<String>,
        #[source]
        cause: Option<Cause>,
    },

    /// Unclassifiable failure.
    #[error("{message}")]
    Unknown {
        message: String,
        provider: Option<String>,
        #[source]
        cause: Option<Cause>,
    },
}

impl TransportFailure {
    /// A caller-input problem.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// An upstream error response. When the provider supplied no message,
    /// the message becomes `"<status> error from <provider>"`.
    pub fn api_status(status: u16, provider: &str, message: Option<String>) -> Self {
        let message = match message {
            Some(m) if !m.trim().is_empty() => m,
            _ => format!("{status} error from {provider}"),
        };
        Self::UpstreamApi {
            message,
            provider: Some(provider.to_string()),
            cause: None,
        }
    }

    /// An unclassifiable failure with a provider tag.
    pub fn unknown(message: impl Into<String>, provider: &str) -> Self {
        Self::Unknown {
            message: message.into(),
            provider: Some(provider.to_string()),
            cause: None,
        }
    }

    /// Classify a transport-level error from `reqwest`.
    ///
    /// An error carrying a response status becomes `UpstreamApi`; a
    /// timeout or connect failure becomes `Network`; everything else
    /// (request construction, redirect policy) becomes `Unknown`.
    pub fn from_transport(err: reqwest::Error, provider: &str) -> Self {
        if let Some(status) = err.status() {
            return Self::UpstreamApi {
                message: format!("{} error from {provider}", status.as_u16()),
                provider: Some(provider.to_string()),
                cause: Some(Box::new(err)),
            };
        }

        if err.is_timeout() || err.is_connect() {
            return Self::Network {
                message: format!("no response from {provider}: {err}"),
                provider: Some(provider.to_string()),
                cause: Some(Box::new(err)),
            };
        }

        Self::Unknown {
            message: format!("request to {provider} failed: {err}"),
            provider: Some(provider.to_string()),
            cause: Some(Box::new(err)),
        }
    }

    /// The kind of this failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation { .. } => FailureKind::Validation,
            Self::UpstreamApi { .. } => FailureKind::UpstreamApi,
            Self::Network { .. } => FailureKind::Network,
            Self::Unknown { .. } => FailureKind::Unknown,
        }
    }

    /// The originating provider, when known.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Validation { .. } => None,
            Self::UpstreamApi { provider, .. }
            | Self::Network { provider, .. }
            | Self::Unknown { provider, .. } => provider.as_deref(),
        }
    }

    /// Whether a caller may reasonably retry. Retry policy itself is a
    /// caller concern; validation failures are never retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::Network | FailureKind::UpstreamApi
        )
    }
}
