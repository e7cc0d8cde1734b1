use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use crate::bucket::Histogram;
use crate::error::Error;

// One search hit. Only created_at is interpreted, the rest is carried through as-is
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub created_at: String,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

// Error payload the search API embeds in its response body
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ApiErrorBody {
    pub message: String,
}

// Search API response format (one page)
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct SearchPage {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
    // v1.1 style error list
    #[serde(default)]
    pub errors: Vec<ApiErrorBody>,
}

impl SearchPage {
    // Cursor for the following page; an empty cursor ends the chain too
    pub fn next_cursor(&self) -> Option<&str> {
        self.next.as_deref().filter(|n| !n.is_empty())
    }
}

// Token endpoint response format
#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub errors: Vec<ApiErrorBody>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct SearchOptions {
    pub longitude: f64,
    pub latitude: f64,
    // `YYYYMMDDHHmm`, UTC
    pub from_date: String,
    // `YYYYMMDDHHmm`, UTC
    pub to_date: String,
}

// Gateway response format
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct HistogramResponse {
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
    pub total: u64,
    pub dropped: u64,
    pub cached: bool,
}

impl HistogramResponse {
    pub fn new(histogram: &Histogram, cached: bool) -> Self {
        Self {
            labels: histogram.labels.clone(),
            counts: histogram.series.counts().to_vec(),
            total: histogram.series.total(),
            dropped: histogram.dropped,
            cached,
        }
    }
}

// Queued job - holds the query + response channel
pub struct HistogramJob {
    pub options: SearchOptions,
    pub response_tx: oneshot::Sender<Result<HistogramResponse, Error>>, // one-time channel to send back the result
}
