//! OAuth2 client-credentials token cache for the air provider.
//!
//! The air provider requires a short-lived bearer token obtained by
//! trading a client id/secret. The cache holds at most one token and
//! re-issues the exchange only when the cached token is absent or
//! expired. The state cell is guarded by a mutex held across the
//! exchange, so overlapping callers serialize behind a single in-flight
//! renewal rather than issuing simultaneous exchanges.

use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::TransportFailure;

use super::AIR_PROVIDER;

/// A cached bearer token. Usable only while `now_ms < expires_at_ms`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub value: String,
    /// Expiry instant as epoch milliseconds.
    pub expires_at_ms: i64,
}

impl CachedToken {
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms
    }
}

/// Successful exchange response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Validity window in seconds.
    expires_in: i64,
}

/// Process-wide token cache for the air provider.
///
/// Construct once and share via `Arc`; every air-mode search goes through
/// the same cache.
pub struct TokenCache {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    state: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    /// Create a cache issuing exchanges against `token_url`.
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, TransportFailure> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransportFailure::from_transport(e, AIR_PROVIDER))?;

        Ok(Self {
            http,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            state: Mutex::new(None),
        })
    }

    /// Return a valid bearer token, exchanging credentials only when the
    /// cached token is absent or expired.
    pub async fn bearer_token(&self) -> Result<String, TransportFailure> {
        let mut state = self.state.lock().await;

        if let Some(token) = state.as_ref()
            && token.is_valid_at(Utc::now().timestamp_millis())
        {
            return Ok(token.value.clone());
        }

        let token = self.exchange().await?;
        let value = token.value.clone();
        *state = Some(token);
        Ok(value)
    }

    /// Perform one client-credentials exchange.
    async fn exchange(&self) -> Result<CachedToken, TransportFailure> {
        debug!(url = %self.token_url, "exchanging client credentials for bearer token");

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
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

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| TransportFailure::from_transport(e, AIR_PROVIDER))?;

        Ok(CachedToken {
            value: body.access_token,
            expires_at_ms: Utc::now().timestamp_millis() + body.expires_in * 1000,
        })
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_validity_window() {
        let token = CachedToken {
            value: "abc".into(),
            expires_at_ms: 1_000,
        };
        assert!(token.is_valid_at(999));
        assert!(!token.is_valid_at(1_000));
        assert!(!token.is_valid_at(1_001));
    }

    #[test]
    fn token_response_parses() {
        let body = r#"{"access_token": "tok-123", "expires_in": 1799, "token_type": "Bearer"}"#;
        let parsed: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.access_token, "tok-123");
        assert_eq!(parsed.expires_in, 1799);
    }
}
