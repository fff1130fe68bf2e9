use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::filter::filter_restaurants;
use super::geocode::{GeocodeResolver, normalize_postcode};
use super::listing::parse_listings;
use crate::clients::{GeocodeError, ListingsError, ListingsProvider};
use crate::domain::{FilterCriteria, Restaurant};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("postcode '{0}' could not be located")]
    LocationNotFound(String),

    #[error(transparent)]
    Geocoding(#[from] GeocodeError),

    #[error(transparent)]
    Listings(#[from] ListingsError),
}

/// Resolve, fetch, validate, filter. One pass per request.
pub struct RestaurantSearchService {
    resolver: Arc<GeocodeResolver>,
    listings: Arc<dyn ListingsProvider>,
}

impl RestaurantSearchService {
    #[must_use]
    pub fn new(resolver: Arc<GeocodeResolver>, listings: Arc<dyn ListingsProvider>) -> Self {
        Self { resolver, listings }
    }

    /// Restaurants near `postcode` matching `criteria`, in feed order.
    ///
    /// # Errors
    ///
    /// - [`SearchError::LocationNotFound`] if the postcode does not geocode;
    ///   the listings provider is not called in that case.
    /// - [`SearchError::Geocoding`] / [`SearchError::Listings`] when either
    ///   upstream fails. Bad individual listings are never an error.
    pub async fn search(
        &self,
        postcode: &str,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Restaurant>, SearchError> {
        let postcode = normalize_postcode(postcode);

        let Some(origin) = self.resolver.resolve(postcode).await? else {
            return Err(SearchError::LocationNotFound(postcode.to_string()));
        };

        let payload = self.listings.fetch_listings(postcode).await?;
        let parsed = parse_listings(&payload);
        debug!(
            postcode,
            valid = parsed.restaurants.len(),
            skipped = parsed.skipped,
            "Validated listings"
        );

        let candidates = parsed.restaurants.len();
        let matches = filter_restaurants(parsed.restaurants, origin, criteria);

        info!(
            postcode,
            %origin,
            candidates,
            matches = matches.len(),
            max_distance = criteria.max_distance_miles,
            "Restaurant search finished"
        );

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{Geocoder, RawPayload};
    use crate::domain::Coordinate;
    use crate::services::geocode_cache::GeocodeCache;
    use crate::services::rate_gate::NoopGate;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const ORIGIN: Coordinate = Coordinate::new(51.501, -0.1419);

    struct FixedGeocoder(Option<Coordinate>);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn geocode(&self, _: &str) -> Result<Option<Coordinate>, GeocodeError> {
            Ok(self.0)
        }
    }

    struct FakeListings {
        payload: Result<Value, u16>,
        calls: AtomicUsize,
    }

    impl FakeListings {
        fn returning(payload: Value) -> Self {
            Self {
                payload: Ok(payload),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ListingsProvider for FakeListings {
        async fn fetch_listings(&self, _: &str) -> Result<RawPayload, ListingsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.payload {
                Ok(value) => Ok(RawPayload::new(value.clone())),
                Err(status) => Err(ListingsError::Status {
                    status: *status,
                    body: "upstream down".to_string(),
                }),
            }
        }
    }

    /// Listing `miles` north of [`ORIGIN`].
    fn listing(id: u64, miles: f64, cuisine: &str, star_rating: f64) -> Value {
        let latitude = ORIGIN.latitude + miles * 1609.344 / 111_250.0;
        json!({
            "id": id,
            "name": format!("Restaurant {id}"),
            "address": {
                "city": "London",
                "firstLine": "1 Test Street",
                "postalCode": "SW1A 1AA",
                "location": {"type": "Point", "coordinates": [ORIGIN.longitude, latitude]}
            },
            "rating": {"count": 5, "starRating": star_rating},
            "cuisines": [{"name": cuisine, "uniqueName": cuisine.to_lowercase()}],
            "logoUrl": "https://img.example.com/logo.gif",
            "isTestRestaurant": false
        })
    }

    fn service(origin: Option<Coordinate>, listings: Arc<FakeListings>) -> RestaurantSearchService {
        let resolver = GeocodeResolver::new(
            Arc::new(FixedGeocoder(origin)),
            Arc::new(GeocodeCache::new(Duration::from_secs(3600), 100)),
            Arc::new(NoopGate),
        );
        RestaurantSearchService::new(Arc::new(resolver), listings)
    }

    fn ids(restaurants: &[Restaurant]) -> Vec<u64> {
        restaurants.iter().map(|r| r.id.value()).collect()
    }

    #[tokio::test]
    async fn italian_within_three_miles_rated_four() {
        let listings = Arc::new(FakeListings::returning(json!({
            "restaurants": [
                listing(1, 2.0, "Italian", 4.2),
                listing(2, 5.0, "Italian", 4.5),
            ]
        })));
        let criteria = FilterCriteria::from_request(Some(3), Some("italian"), Some(4), 3, 3).unwrap();

        let found = service(Some(ORIGIN), listings)
            .search("SW1A 1AA", &criteria)
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![1]);
    }

    #[tokio::test]
    async fn default_min_rating_of_three_is_inclusive() {
        let listings = Arc::new(FakeListings::returning(json!({
            "restaurants": [
                listing(3, 1.0, "Thai", 2.9),
                listing(4, 1.0, "Thai", 3.0),
            ]
        })));

        let found = service(Some(ORIGIN), listings)
            .search("SW1A 1AA", &FilterCriteria::default())
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![4]);
    }

    #[tokio::test]
    async fn unknown_postcode_skips_the_listings_call() {
        let listings = Arc::new(FakeListings::returning(json!({"restaurants": []})));

        let err = service(None, listings.clone())
            .search(" XX1 1XX ", &FilterCriteria::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::LocationNotFound(ref p) if p == "XX1 1XX"));
        assert_eq!(listings.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_restaurants_never_come_back() {
        let mut flagged = listing(5, 0.5, "Italian", 5.0);
        flagged["isTestRestaurant"] = json!(true);
        let listings = Arc::new(FakeListings::returning(json!({
            "restaurants": [flagged, listing(6, 0.5, "Italian", 5.0)]
        })));

        let found = service(Some(ORIGIN), listings)
            .search("SW1A 1AA", &FilterCriteria::default())
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![6]);
    }

    #[tokio::test]
    async fn malformed_entries_are_dropped_and_order_kept() {
        let listings = Arc::new(FakeListings::returning(json!({
            "restaurants": [
                listing(10, 0.5, "Thai", 4.0),
                {"id": "broken"},
                listing(11, 9.0, "Thai", 4.0),
                42,
                listing(12, 1.5, "Thai", 4.0),
                {"name": "no id", "isTestRestaurant": false},
                listing(13, 2.5, "Thai", 3.5),
            ]
        })));

        let found = service(Some(ORIGIN), listings)
            .search("SW1A 1AA", &FilterCriteria::default())
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![10, 12, 13]);
    }

    #[tokio::test]
    async fn upstream_status_is_surfaced() {
        let listings = Arc::new(FakeListings {
            payload: Err(502),
            calls: AtomicUsize::new(0),
        });

        let err = service(Some(ORIGIN), listings)
            .search("SW1A 1AA", &FilterCriteria::default())
            .await
            .unwrap_err();

        match err {
            SearchError::Listings(e) => assert_eq!(e.status(), Some(502)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
