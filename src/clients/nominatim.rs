use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::Geocoder;
use crate::config::GeocoderConfig;
use crate::domain::Coordinate;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Transport(String),

    #[error("geocoding service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected geocoding response: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimPlace {
    fn coordinate(&self) -> Result<Coordinate, GeocodeError> {
        let latitude: f64 = self
            .lat
            .parse()
            .map_err(|_| GeocodeError::Decode(format!("bad latitude '{}'", self.lat)))?;
        let longitude: f64 = self
            .lon
            .parse()
            .map_err(|_| GeocodeError::Decode(format!("bad longitude '{}'", self.lon)))?;

        let point = Coordinate::new(latitude, longitude);
        if !point.is_valid() {
            return Err(GeocodeError::Decode(format!("coordinate out of range {point}")));
        }
        Ok(point)
    }
}

/// Client for an OpenStreetMap Nominatim compatible `/search` endpoint.
#[derive(Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
    user_agent: String,
    country_codes: String,
    timeout: Duration,
}

impl NominatimClient {
    #[must_use]
    pub fn new(config: &GeocoderConfig) -> Self {
        Self::with_shared_client(Client::new(), config)
    }

    #[must_use]
    pub fn with_shared_client(client: Client, config: &GeocoderConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            country_codes: config.country_codes.clone(),
            timeout: Duration::from_secs(config.request_timeout_seconds),
        }
    }

    fn search_url(&self, postcode: &str) -> Result<Url, GeocodeError> {
        let mut url = Url::parse(&format!("{}/search", self.base_url))
            .map_err(|e| GeocodeError::Transport(format!("invalid geocoder url: {e}")))?;

        url.query_pairs_mut()
            .append_pair("q", postcode)
            .append_pair("countrycodes", &self.country_codes)
            .append_pair("format", "json")
            .append_pair("limit", "1");

        Ok(url)
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(&self, postcode: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let url = self.search_url(postcode)?;
        debug!(postcode, "Querying geocoder");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Status { status, body });
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::Decode(e.to_string()))?;

        match places.first() {
            Some(place) => {
                debug!(
                    postcode,
                    place = place.display_name.as_deref().unwrap_or(""),
                    "Geocoder match"
                );
                place.coordinate().map(Some)
            }
            None => Ok(None),
        }
    }
}
