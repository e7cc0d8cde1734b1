use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, mpsc};
use tracing::{info, warn};
use crate::cache::{CacheEntry, evict_expired, make_cache_key};
use crate::chart::{ChartState, render};
use crate::metrics::{CACHE_HITS, CACHE_MISSES, CACHE_SIZE};
use crate::models::{HistogramJob, HistogramResponse};
use crate::pipeline::HistogramService;

// Processes queued jobs one at a time, so only one pagination chain is in flight
pub async fn histogram_worker(
    mut rx: mpsc::Receiver<HistogramJob>,
    service: Arc<HistogramService>,
    cache: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
    chart: Arc<RwLock<ChartState>>,
) {
    info!("histogram worker started - processing jobs sequentially");

    while let Some(job) = rx.recv().await {
        let cache_key = make_cache_key(&job.options);

        // stale entries go before the lookup, so whatever is left is fresh
        evict_expired(&cache, ttl);
        let cached = cache.get(&cache_key).map(|entry| entry.histogram.clone());

        if let Some(histogram) = cached {
            CACHE_HITS.inc();
            render(&mut *chart.write().await, &histogram);
            let _ = job.response_tx.send(Ok(HistogramResponse::new(&histogram, true)));
            continue;
        }
        CACHE_MISSES.inc();

        let response = match service.histogram(&job.options).await {
            Ok(histogram) => {
                render(&mut *chart.write().await, &histogram);
                let response = HistogramResponse::new(&histogram, false);
                cache.insert(cache_key, CacheEntry::new(histogram));
                CACHE_SIZE.set(cache.len() as f64);
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "histogram job failed");
                Err(e)
            }
        };
        // Send result back to handler
        let _ = job.response_tx.send(response);
    }
}
