mod chart;
mod health;
mod histogram;
mod metrics;

use axum::{Json, Router, http::StatusCode, response::{IntoResponse, Response}, routing::{get, post}};
use std::sync::Arc;
use crate::error::Error;
use crate::state::AppState;

pub use chart::chart_handler;
pub use health::health_handler;
pub use histogram::histogram_handler;
pub use metrics::metrics_handler;

// creating the router with routes
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/histogram", post(histogram_handler))
        .route("/api/chart", get(chart_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

// Handler-level failures, each mapped to a status code
#[derive(Debug)]
pub enum ApiError {
    RateLimited,
    WorkerUnavailable,
    Pipeline(Error),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Pipeline(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::WorkerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Pipeline(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(Error::Storage(_) | Error::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Pipeline(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::RateLimited => "Rate limit exceeded. Try again later.".to_string(),
            ApiError::WorkerUnavailable => "Histogram worker unavailable".to_string(),
            ApiError::Pipeline(e) => e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message() }));
        (self.status(), body).into_response()
    }
}
