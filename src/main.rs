use clap::Parser; // for cli
use dashmap::DashMap;
use geo_search_histogram::auth::{ClientCredential, FileTokenStore};
use geo_search_histogram::chart::ChartState;
use geo_search_histogram::config::{Args, Endpoints};
use geo_search_histogram::handlers::router;
use geo_search_histogram::models::HistogramJob;
use geo_search_histogram::pipeline::HistogramService;
use geo_search_histogram::rate_limit::RateLimiter;
use geo_search_histogram::search::SearchClient;
use geo_search_histogram::state::AppState;
use geo_search_histogram::worker::histogram_worker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, mpsc};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // parse cli arguments
    let args = Args::parse();
    let endpoints = Endpoints::from_args(&args)?;
    let client = reqwest::Client::new();

    let search = SearchClient::new(client.clone(), endpoints.search_url.clone())
        .with_max_results(args.max_results)
        .with_radius(args.radius.clone());
    let service = HistogramService::new(
        client,
        endpoints.token_url.clone(),
        ClientCredential::new(args.auth_key.clone()),
        Arc::new(FileTokenStore::new(&args.token_store)),
        search,
    )
    .with_bucket_minutes(args.bucket_minutes)?
    .with_token_reuse(args.reuse_token);

    let (job_tx, job_rx) = mpsc::channel::<HistogramJob>(100);
    let chart = Arc::new(RwLock::new(ChartState::default()));

    // creating shared state
    let state = Arc::new(AppState {
        rate_limiter: RateLimiter::new(args.rate_limit, Duration::from_secs(args.rate_window)),
        job_tx,
        chart: chart.clone(),
    });

    // spawn the background worker
    tokio::spawn(histogram_worker(
        job_rx,
        Arc::new(service),
        Arc::new(DashMap::new()),
        Duration::from_secs(args.cache_ttl),
        chart,
    ));

    let app = router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Gateway running on http://localhost:{}", args.port);
    info!("Searching {}", endpoints.search_url);
    info!("Bucket width: {} minutes", args.bucket_minutes);
    info!("Cache TTL: {} seconds", args.cache_ttl);
    info!(
        "Rate limit: {} requests per {} seconds",
        args.rate_limit, args.rate_window
    );
    axum::serve(listener, app).await?;
    Ok(())
}
