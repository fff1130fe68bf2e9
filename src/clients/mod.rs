//! Outbound HTTP clients and the seams the services depend on.

pub mod just_eat;
pub mod nominatim;

use async_trait::async_trait;

use crate::domain::Coordinate;
pub use just_eat::{JustEatClient, ListingsError, RawPayload};
pub use nominatim::{GeocodeError, NominatimClient};

/// Resolves a postal code to a coordinate.
///
/// `Ok(None)` means the service answered but knows no such place, which is
/// different from failing to answer at all.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, postcode: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

/// Fetches the raw, unvalidated restaurant listings for a postal code.
#[async_trait]
pub trait ListingsProvider: Send + Sync {
    async fn fetch_listings(&self, postcode: &str) -> Result<RawPayload, ListingsError>;
}
