use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_MAX_DISTANCE_MILES: u32 = 3;
pub const DEFAULT_MIN_RATING: u8 = 3;
pub const MAX_STAR_RATING: u8 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("min_rating must be between 0 and {MAX_STAR_RATING}, got {0}")]
    MinRatingOutOfRange(u32),
}

/// What a caller is looking for. Immutable for the lifetime of one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCriteria {
    pub max_distance_miles: f64,

    /// Lowercased, trimmed cuisine names. Empty means "any cuisine".
    pub cuisines: Vec<String>,

    pub min_rating: Option<f64>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            max_distance_miles: f64::from(DEFAULT_MAX_DISTANCE_MILES),
            cuisines: Vec::new(),
            min_rating: Some(f64::from(DEFAULT_MIN_RATING)),
        }
    }
}

impl FilterCriteria {
    /// Builds criteria from the raw inbound query values, falling back to the
    /// supplied defaults for anything the caller left out.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::MinRatingOutOfRange`] when `min_rating` is above 5.
    pub fn from_request(
        distance: Option<u32>,
        cuisines: Option<&str>,
        min_rating: Option<u32>,
        default_distance: u32,
        default_min_rating: u8,
    ) -> Result<Self, CriteriaError> {
        let min_rating = min_rating.unwrap_or_else(|| u32::from(default_min_rating));
        if min_rating > u32::from(MAX_STAR_RATING) {
            return Err(CriteriaError::MinRatingOutOfRange(min_rating));
        }

        Ok(Self {
            max_distance_miles: f64::from(distance.unwrap_or(default_distance)),
            cuisines: cuisines.map(parse_cuisine_list).unwrap_or_default(),
            min_rating: Some(f64::from(min_rating)),
        })
    }

    #[must_use]
    pub fn with_max_distance(mut self, miles: f64) -> Self {
        self.max_distance_miles = miles;
        self
    }

    #[must_use]
    pub fn with_cuisines(mut self, list: &str) -> Self {
        self.cuisines = parse_cuisine_list(list);
        self
    }

    #[must_use]
    pub const fn with_min_rating(mut self, rating: Option<f64>) -> Self {
        self.min_rating = rating;
        self
    }
}

/// Splits a pipe-separated list such as `"italian| Indian"`.
///
/// ```rust
/// use restaurant_finder::domain::criteria::parse_cuisine_list;
///
/// assert_eq!(parse_cuisine_list("italian| Indian"), vec!["italian", "indian"]);
/// assert!(parse_cuisine_list(" | ").is_empty());
/// ```
#[must_use]
pub fn parse_cuisine_list(list: &str) -> Vec<String> {
    list.split('|')
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect()
}
