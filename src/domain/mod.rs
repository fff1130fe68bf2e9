//! Domain types for restaurant search with strong typing.
//!
//! Everything in here is a plain value: coordinates, validated restaurant
//! records and the per-request filter criteria. None of it is persisted.

pub mod criteria;
pub mod restaurant;

pub use criteria::{CriteriaError, FilterCriteria};
pub use restaurant::{Address, Cuisine, Location, Rating, Restaurant, RestaurantId};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the WGS-84 ellipsoid, in decimal degrees.
///
/// Always stored latitude first. Upstream feeds that carry longitude first
/// must go through [`Coordinate::from_lon_lat`].
///
/// # Examples
///
/// ```rust
/// use restaurant_finder::domain::Coordinate;
///
/// let point = Coordinate::from_lon_lat([-0.1419, 51.5010]);
/// assert_eq!(point.latitude, 51.5010);
/// assert_eq!(point.longitude, -0.1419);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Re-pairs a GeoJSON style `[longitude, latitude]` array.
    #[must_use]
    pub const fn from_lon_lat(pair: [f64; 2]) -> Self {
        Self {
            latitude: pair[1],
            longitude: pair[0],
        }
    }

    /// Finite and within the usual latitude/longitude ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}
