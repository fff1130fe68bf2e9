use std::sync::Arc;

use crate::clients::{Geocoder, JustEatClient, ListingsProvider, NominatimClient};
use crate::config::Config;
use crate::services::{GeocodeResolver, RestaurantSearchService};

/// Build a shared HTTP client for both upstreams.
/// Per-call timeouts are applied by each client from its own config section.
fn build_shared_http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("restaurant-finder/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Process-wide handles shared by the HTTP layer and the CLI.
///
/// The geocode cache and rate gate live inside the resolver, so every request
/// served from one `SharedState` shares them.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub search: Arc<RestaurantSearchService>,
}

impl SharedState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client()?;

        let geocoder = Arc::new(NominatimClient::with_shared_client(
            http_client.clone(),
            &config.geocoder,
        ));
        let listings = Arc::new(JustEatClient::with_shared_client(
            http_client,
            &config.listings,
        ));

        Ok(Self::with_providers(config, geocoder, listings))
    }

    /// Wires the services around arbitrary upstream implementations.
    #[must_use]
    pub fn with_providers(
        config: Config,
        geocoder: Arc<dyn Geocoder>,
        listings: Arc<dyn ListingsProvider>,
    ) -> Self {
        let resolver = Arc::new(GeocodeResolver::from_config(geocoder, &config.geocoder));
        let search = Arc::new(RestaurantSearchService::new(resolver, listings));

        Self {
            config: Arc::new(config),
            search,
        }
    }

    /// Same as [`SharedState::with_providers`] but with a caller-built resolver,
    /// e.g. one with a manual clock or no rate gate.
    #[must_use]
    pub fn with_resolver(
        config: Config,
        resolver: Arc<GeocodeResolver>,
        listings: Arc<dyn ListingsProvider>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            search: Arc::new(RestaurantSearchService::new(resolver, listings)),
        }
    }
}
