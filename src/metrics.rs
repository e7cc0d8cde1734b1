use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("geosearch_requests_total", "Total number of histogram requests").unwrap();
    pub static ref PAGES_FETCHED: Counter =
        register_counter!("geosearch_pages_fetched_total", "Search pages fetched from the API").unwrap();
    pub static ref RESULTS_FETCHED: Counter =
        register_counter!("geosearch_results_fetched_total", "Search results fetched from the API").unwrap();
    pub static ref RESULTS_DROPPED: Counter =
        register_counter!("geosearch_results_dropped_total", "Results outside their time window").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("geosearch_cache_hits_total", "Total cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("geosearch_cache_misses_total", "Total cache misses").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "geosearch_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("geosearch_cache_size", "Current number of histograms in cache").unwrap();
}
