//! Validated restaurant records.
//!
//! These are only ever built by [`crate::services::listing::parse_listing`];
//! serialization mirrors the upstream field names so clients see the same
//! shape the listings provider uses.

use super::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream numeric identifier of a restaurant.
///
/// # Examples
///
/// ```rust
/// use restaurant_finder::domain::RestaurantId;
///
/// let id = RestaurantId::new(12345);
/// assert_eq!(id.value(), 12345);
/// assert_eq!(id.to_string(), "12345");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestaurantId(u64);

impl RestaurantId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RestaurantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// GeoJSON-ish point as delivered by the listings feed.
///
/// `kind` keeps the geometry tag (normally `"Point"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: String,
    pub longitude: f64,
    pub latitude: f64,
}

impl Location {
    /// Latitude-first coordinate for distance math.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::from_lon_lat([self.longitude, self.latitude])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub city: String,
    pub first_line: String,
    pub postal_code: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub count: u64,
    pub star_rating: f64,
    pub user_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cuisine {
    pub name: String,
    pub unique_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub address: Address,
    pub rating: Rating,
    pub cuisines: Vec<Cuisine>,
    pub logo_url: String,
    pub is_test_restaurant: bool,
}

impl Restaurant {
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        self.address.location.coordinate()
    }

    /// Case-insensitive match against any of the restaurant's cuisine names.
    #[must_use]
    pub fn serves(&self, cuisine: &str) -> bool {
        self.cuisines
            .iter()
            .any(|c| c.name.to_lowercase() == cuisine.to_lowercase())
    }
}
