//! `/metrics` and per-request accounting.
//!
//! Every request is counted under its route template and a [`RequestOutcome`],
//! so a spike of unknown postcodes and a failing upstream show up as different
//! series instead of one bucket of 4xx/5xx.

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::api::AppState;

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.prometheus_handle {
        Some(handle) => handle.render().into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder is disabled",
        )
            .into_response(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Ok,
    LocationNotFound,
    InvalidQuery,
    UpstreamFailure,
    UnknownRoute,
    Failed,
}

impl RequestOutcome {
    #[must_use]
    pub const fn as_label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::LocationNotFound => "location_not_found",
            Self::InvalidQuery => "invalid_query",
            Self::UpstreamFailure => "upstream_failure",
            Self::UnknownRoute => "unknown_route",
            Self::Failed => "failed",
        }
    }

    /// Prefers the outcome an `ApiError` attached; otherwise falls back to the
    /// status (extractor rejections, router fallback).
    #[must_use]
    pub fn of(response: &Response) -> Self {
        if let Some(outcome) = response.extensions().get::<Self>() {
            return *outcome;
        }

        let status = response.status();
        if status.is_success() {
            Self::Ok
        } else if status == StatusCode::NOT_FOUND {
            Self::UnknownRoute
        } else if status.is_client_error() {
            Self::InvalidQuery
        } else {
            Self::Failed
        }
    }
}

pub async fn track_requests(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    // Route template, never the raw path: postcodes would explode cardinality.
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %method,
        route = %route,
    );

    async move {
        let response = next.run(req).await;
        let outcome = RequestOutcome::of(&response);
        let elapsed = started.elapsed();

        let labels = [
            ("method", method),
            ("route", route),
            ("outcome", outcome.as_label().to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let status = response.status().as_u16();
        match outcome {
            RequestOutcome::UpstreamFailure | RequestOutcome::Failed => warn!(
                status,
                duration_ms,
                outcome = outcome.as_label(),
                "Request failed"
            ),
            _ => info!(
                status,
                duration_ms,
                outcome = outcome.as_label(),
                "Request finished"
            ),
        }

        response
    }
    .instrument(span)
    .await
}
