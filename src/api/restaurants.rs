use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::{ApiError, AppState, RestaurantQuery};
use crate::domain::{FilterCriteria, Restaurant};

/// Matching restaurants as a bare JSON array in feed order. Errors keep the
/// `ApiResponse` envelope.
pub async fn search_restaurants(
    State(state): State<Arc<AppState>>,
    Path(postcode): Path<String>,
    Query(query): Query<RestaurantQuery>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    let defaults = &state.config().search;

    let criteria = FilterCriteria::from_request(
        query.distance,
        query.cuisines.as_deref(),
        query.min_rating,
        defaults.default_distance_miles,
        defaults.default_min_rating,
    )?;

    tracing::debug!(
        postcode = %postcode,
        max_distance_miles = criteria.max_distance_miles,
        cuisines = ?criteria.cuisines,
        min_rating = ?criteria.min_rating,
        "Searching restaurants"
    );

    let restaurants = state.search().search(&postcode, &criteria).await?;

    Ok(Json(restaurants))
}
