use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use crate::chart::ChartState;
use crate::models::HistogramJob;
use crate::rate_limit::RateLimiter;
// app's shared state

pub struct AppState {
    pub rate_limiter: RateLimiter,
    pub job_tx: mpsc::Sender<HistogramJob>, // queue into the worker
    pub chart: Arc<RwLock<ChartState>>,      // last rendered histogram
}
