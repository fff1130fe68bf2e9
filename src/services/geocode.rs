use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::geocode_cache::GeocodeCache;
use super::rate_gate::{IntervalGate, RateGate};
use crate::clients::{GeocodeError, Geocoder};
use crate::config::GeocoderConfig;
use crate::domain::Coordinate;

/// Postcode to coordinate lookup with caching and upstream pacing.
///
/// Cache hits never touch the gate; only real calls to the geocoder wait
/// for a slot. Two concurrent misses for the same postcode may both call
/// out, and whichever finishes last owns the cache entry.
pub struct GeocodeResolver {
    geocoder: Arc<dyn Geocoder>,
    cache: Arc<GeocodeCache>,
    gate: Arc<dyn RateGate>,
}

impl GeocodeResolver {
    #[must_use]
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        cache: Arc<GeocodeCache>,
        gate: Arc<dyn RateGate>,
    ) -> Self {
        Self {
            geocoder,
            cache,
            gate,
        }
    }

    /// Cache and gate sized from config.
    #[must_use]
    pub fn from_config(geocoder: Arc<dyn Geocoder>, config: &GeocoderConfig) -> Self {
        let cache = GeocodeCache::new(
            Duration::from_secs(config.cache_ttl_seconds),
            config.cache_capacity,
        );
        let gate = IntervalGate::new(Duration::from_millis(config.min_interval_ms));
        Self::new(geocoder, Arc::new(cache), Arc::new(gate))
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<GeocodeCache> {
        &self.cache
    }

    /// `Ok(None)` when the postcode cannot be located.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] when the geocoder could not be reached or
    /// answered with something unusable.
    pub async fn resolve(&self, postcode: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let key = normalize_postcode(postcode);
        if key.is_empty() {
            return Ok(None);
        }

        if let Some(coordinate) = self.cache.get(key) {
            debug!(postcode = key, "Geocode cache hit");
            metrics::counter!("geocode_cache_hits_total").increment(1);
            return Ok(Some(coordinate));
        }
        metrics::counter!("geocode_cache_misses_total").increment(1);

        self.gate.acquire().await;
        metrics::counter!("geocode_requests_total").increment(1);

        match self.geocoder.geocode(key).await {
            Ok(Some(coordinate)) => {
                info!(postcode = key, %coordinate, "Resolved postcode");
                self.cache.insert(key, coordinate);
                Ok(Some(coordinate))
            }
            Ok(None) => {
                info!(postcode = key, "Postcode not found");
                Ok(None)
            }
            Err(e) => {
                warn!(postcode = key, error = %e, "Geocoding failed");
                Err(e)
            }
        }
    }
}

/// Cache key and outbound query form of a postcode.
#[must_use]
pub fn normalize_postcode(postcode: &str) -> &str {
    postcode.trim()
}
