//! Ellipsoidal distance on WGS-84 (Karney's geodesic algorithm).

use geographiclib_rs::{Geodesic, InverseGeodesic};
use thiserror::Error;

use crate::domain::Coordinate;

pub const METRES_PER_MILE: f64 = 1609.344;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DistanceError {
    #[error("invalid coordinate {0}")]
    InvalidCoordinate(Coordinate),
}

/// Geodesic distance in metres. Converges for every pair of valid points,
/// antipodes included.
///
/// # Errors
///
/// Fails on non-finite or out-of-range coordinates.
pub fn distance_metres(from: Coordinate, to: Coordinate) -> Result<f64, DistanceError> {
    if !from.is_valid() {
        return Err(DistanceError::InvalidCoordinate(from));
    }
    if !to.is_valid() {
        return Err(DistanceError::InvalidCoordinate(to));
    }

    let s12: f64 = Geodesic::wgs84().inverse(
        from.latitude,
        from.longitude,
        to.latitude,
        to.longitude,
    );
    Ok(s12)
}

/// Geodesic distance in statute miles.
///
/// # Errors
///
/// See [`distance_metres`].
pub fn distance_miles(from: Coordinate, to: Coordinate) -> Result<f64, DistanceError> {
    distance_metres(from, to).map(|m| m / METRES_PER_MILE)
}
