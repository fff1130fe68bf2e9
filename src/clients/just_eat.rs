use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::ListingsProvider;
use crate::config::ListingsConfig;

#[derive(Debug, Error)]
pub enum ListingsError {
    #[error("listings request failed: {0}")]
    Transport(String),

    #[error("listings provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("listings payload is not JSON: {0}")]
    Decode(String),
}

impl ListingsError {
    /// Upstream HTTP status, when the provider answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Listings payload exactly as the provider sent it.
///
/// Nothing in here has been validated; see [`crate::services::listing`].
#[derive(Debug, Clone, Default)]
pub struct RawPayload(Value);

impl RawPayload {
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Entries of the top-level `restaurants` array. Missing or non-array
    /// means no listings.
    #[must_use]
    pub fn entries(&self) -> &[Value] {
        self.0
            .get("restaurants")
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }
}

#[derive(Clone)]
pub struct JustEatClient {
    client: Client,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

impl JustEatClient {
    #[must_use]
    pub fn new(config: &ListingsConfig) -> Self {
        Self::with_shared_client(Client::new(), config)
    }

    #[must_use]
    pub fn with_shared_client(client: Client, config: &ListingsConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.request_timeout_seconds),
        }
    }

    fn listings_url(&self, postcode: &str) -> String {
        let compact: String = postcode.chars().filter(|c| !c.is_whitespace()).collect();
        format!(
            "{}/discovery/uk/restaurants/enriched/bypostcode/{}",
            self.base_url,
            urlencoding::encode(&compact)
        )
    }
}

#[async_trait]
impl ListingsProvider for JustEatClient {
    async fn fetch_listings(&self, postcode: &str) -> Result<RawPayload, ListingsError> {
        let url = self.listings_url(postcode);
        debug!(%url, "Fetching restaurant listings");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ListingsError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ListingsError::Status { status, body });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ListingsError::Decode(e.to_string()))?;

        Ok(RawPayload::new(payload))
    }
}
