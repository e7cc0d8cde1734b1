use axum::{Json, extract::State};
use std::sync::Arc;
use crate::chart::ChartSnapshot;
use crate::state::AppState;

// What the chart widget should currently display
pub async fn chart_handler(State(state): State<Arc<AppState>>) -> Json<ChartSnapshot> {
    Json(state.chart.read().await.snapshot())
}
