use chrono::TimeDelta;
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, info};
use crate::auth::{AccessToken, ClientCredential, TokenStore, acquire_token};
use crate::bucket::{DEFAULT_BUCKET_MINUTES, Histogram, bucket_count, bucketize};
use crate::chart::{ChartSink, render};
use crate::error::{Error, Result};
use crate::metrics::RESULTS_DROPPED;
use crate::models::SearchOptions;
use crate::search::SearchClient;
use crate::window::TimeWindow;

pub struct HistogramService {
    client: reqwest::Client,
    token_url: Url,
    credential: ClientCredential,
    store: Arc<dyn TokenStore>,
    search: SearchClient,
    bucket_width: TimeDelta,
    reuse_token: bool,
}

impl HistogramService {
    pub fn new(
        client: reqwest::Client,
        token_url: Url,
        credential: ClientCredential,
        store: Arc<dyn TokenStore>,
        search: SearchClient,
    ) -> Self {
        Self {
            client,
            token_url,
            credential,
            store,
            search,
            bucket_width: TimeDelta::minutes(DEFAULT_BUCKET_MINUTES),
            reuse_token: false,
        }
    }

    pub fn with_bucket_minutes(mut self, minutes: i64) -> Result<Self> {
        if minutes <= 0 {
            return Err(Error::InvalidBucketWidth(minutes));
        }
        self.bucket_width = TimeDelta::try_minutes(minutes).ok_or(Error::InvalidBucketWidth(minutes))?;
        Ok(self)
    }

    pub fn with_token_reuse(mut self, reuse: bool) -> Self {
        self.reuse_token = reuse;
        self
    }

    // Stored token if reuse is on and one exists, otherwise a fresh exchange
    async fn token(&self) -> Result<AccessToken> {
        if self.reuse_token {
            if let Some(token) = self.store.load()? {
                debug!("reusing stored access token");
                return Ok(token);
            }
        }
        acquire_token(&self.client, &self.token_url, &self.credential, self.store.as_ref()).await
    }

    pub async fn histogram(&self, options: &SearchOptions) -> Result<Histogram> {
        // reject a bad window before spending any requests on it
        let window = TimeWindow::from_api_dates(&options.from_date, &options.to_date)?;
        bucket_count(&window, self.bucket_width)?;

        let token = self.token().await?;
        let results = self.search.fetch_all(&token, options).await?;
        let histogram = bucketize(&results, &window, self.bucket_width)?;

        RESULTS_DROPPED.inc_by(histogram.dropped as f64);
        info!(
            results = results.len(),
            buckets = histogram.series.len(),
            dropped = histogram.dropped,
            "histogram built"
        );
        Ok(histogram)
    }

    // Builds the histogram and hands it to `chart`. The chart is only touched on success.
    pub async fn fetch_and_render<C: ChartSink + ?Sized>(
        &self,
        options: &SearchOptions,
        chart: &mut C,
    ) -> Result<Histogram> {
        let histogram = self.histogram(options).await?;
        render(chart, &histogram);
        Ok(histogram)
    }
}
