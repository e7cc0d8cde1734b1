use axum::{Json, extract::State};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use crate::handlers::ApiError;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{HistogramJob, HistogramResponse, SearchOptions};
use crate::state::AppState;

pub async fn histogram_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SearchOptions>,
) -> Result<Json<HistogramResponse>, ApiError> {
    REQUEST_TOTAL.inc();

    if !state.rate_limiter.check("global") {
        return Err(ApiError::RateLimited);
    }

    let start_time = Instant::now();

    let (response_tx, response_rx) = oneshot::channel();

    let job = HistogramJob {
        options: payload,
        response_tx,
    };

    state.job_tx.send(job).await
        .map_err(|_| ApiError::WorkerUnavailable)?;

    // wait for the worker
    let result = response_rx.await
        .map_err(|_| ApiError::WorkerUnavailable)?;

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    Ok(Json(result?))
}
