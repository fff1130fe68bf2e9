//! Per-record predicate over validated restaurants.
//!
//! [`evaluate`] keeps the three outcomes apart (match, rejected by a
//! criterion, excluded because it could not be evaluated) so tests can see
//! why a record went missing. Callers that only need a yes/no use
//! [`matches`] or [`filter_restaurants`].

use thiserror::Error;

use super::geodesy::{self, DistanceError};
use crate::domain::{Coordinate, FilterCriteria, Restaurant};

#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    TooFar { distance_miles: f64 },
    CuisineMismatch,
    RatingTooLow { star_rating: f64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationError {
    #[error(transparent)]
    Distance(#[from] DistanceError),

    #[error("star rating {0} is not a number")]
    NonFiniteRating(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Match { distance_miles: f64 },
    NoMatch(Rejection),
    Excluded(EvaluationError),
}

impl MatchOutcome {
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }
}

/// Checks distance, then cuisine, then rating. Pure in its inputs.
#[must_use]
pub fn evaluate(
    restaurant: &Restaurant,
    origin: Coordinate,
    criteria: &FilterCriteria,
) -> MatchOutcome {
    let distance_miles = match geodesy::distance_miles(origin, restaurant.coordinate()) {
        Ok(d) => d,
        Err(e) => return MatchOutcome::Excluded(e.into()),
    };

    if distance_miles > criteria.max_distance_miles {
        return MatchOutcome::NoMatch(Rejection::TooFar { distance_miles });
    }

    if !criteria.cuisines.is_empty()
        && !criteria
            .cuisines
            .iter()
            .any(|wanted| restaurant.serves(wanted.trim()))
    {
        return MatchOutcome::NoMatch(Rejection::CuisineMismatch);
    }

    if let Some(min_rating) = criteria.min_rating {
        let star_rating = restaurant.rating.star_rating;
        if !star_rating.is_finite() {
            return MatchOutcome::Excluded(EvaluationError::NonFiniteRating(star_rating));
        }
        if star_rating < min_rating {
            return MatchOutcome::NoMatch(Rejection::RatingTooLow { star_rating });
        }
    }

    MatchOutcome::Match { distance_miles }
}

#[must_use]
pub fn matches(restaurant: &Restaurant, origin: Coordinate, criteria: &FilterCriteria) -> bool {
    evaluate(restaurant, origin, criteria).is_match()
}

/// Keeps matching restaurants in their original order.
#[must_use]
pub fn filter_restaurants(
    restaurants: Vec<Restaurant>,
    origin: Coordinate,
    criteria: &FilterCriteria,
) -> Vec<Restaurant> {
    restaurants
        .into_iter()
        .filter(|r| matches(r, origin, criteria))
        .collect()
}
