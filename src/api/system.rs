use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiInfo, ApiResponse, AppState, EndpointInfo, HealthLiveResponse};

pub async fn root() -> Json<ApiResponse<ApiInfo>> {
    Json(ApiResponse::success(ApiInfo {
        message: "Welcome to the Restaurant Finder API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            EndpointInfo {
                path: "/restaurants/{postcode}",
                description: "Restaurants near a UK postcode. Query: distance (miles, default 3), cuisines (pipe-separated), min_rating (0-5, default 3)",
            },
            EndpointInfo {
                path: "/health",
                description: "Liveness probe",
            },
            EndpointInfo {
                path: "/metrics",
                description: "Prometheus metrics",
            },
        ],
    }))
}

pub async fn health_live(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<HealthLiveResponse>> {
    Json(ApiResponse::success(HealthLiveResponse {
        status: "ok",
        uptime_seconds: state.start_time.elapsed().as_secs(),
    }))
}
