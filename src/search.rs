use futures::{Stream, TryStreamExt, stream};
use reqwest::Url;
use tracing::debug;
use crate::auth::AccessToken;
use crate::error::{Error, Result};
use crate::metrics::{PAGES_FETCHED, RESULTS_FETCHED};
use crate::models::{SearchOptions, SearchPage, SearchResult};

pub const DEFAULT_MAX_RESULTS: u32 = 100;
pub const DEFAULT_RADIUS: &str = "1mi";

#[derive(Clone)]
pub struct SearchClient {
    client: reqwest::Client,
    search_url: Url,
    max_results: u32,
    radius: String,
}

impl SearchClient {
    pub fn new(client: reqwest::Client, search_url: Url) -> Self {
        Self {
            client,
            search_url,
            max_results: DEFAULT_MAX_RESULTS,
            radius: DEFAULT_RADIUS.to_string(),
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_radius(mut self, radius: impl Into<String>) -> Self {
        self.radius = radius.into();
        self
    }

    // e.g. "point_radius:[-122.4 37.7 1mi]"
    fn geo_query(&self, options: &SearchOptions) -> String {
        format!("point_radius:[{} {} {}]", options.longitude, options.latitude, self.radius)
    }

    pub fn page_url(&self, cursor: Option<&str>, options: &SearchOptions) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("query", &self.geo_query(options))
                .append_pair("maxResults", &self.max_results.to_string())
                .append_pair("fromDate", &options.from_date)
                .append_pair("toDate", &options.to_date);
            if let Some(next) = cursor {
                query.append_pair("next", next);
            }
        }
        url
    }

    pub async fn fetch_page(
        &self,
        cursor: Option<&str>,
        token: &AccessToken,
        options: &SearchOptions,
    ) -> Result<SearchPage> {
        let res = self
            .client
            .get(self.page_url(cursor, options))
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        let mut page: SearchPage = match serde_json::from_str(&body) {
            Ok(page) => page,
            Err(_) if !status.is_success() => {
                return Err(Error::SearchApi(format!("search request failed with {status}")));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(error) = page.error.take() {
            return Err(Error::SearchApi(error.message));
        }
        if !page.errors.is_empty() {
            let messages: Vec<&str> = page.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(Error::SearchApi(messages.join("; ")));
        }
        if !status.is_success() {
            return Err(Error::SearchApi(format!("search request failed with {status}")));
        }

        PAGES_FETCHED.inc();
        RESULTS_FETCHED.inc_by(page.results.len() as f64);
        debug!(
            results = page.results.len(),
            has_next = page.next_cursor().is_some(),
            "fetched page"
        );
        Ok(page)
    }

    // Lazy: one request per poll, ends after the first page without `next`
    pub fn pages<'a>(
        &'a self,
        token: &'a AccessToken,
        options: &'a SearchOptions,
    ) -> impl Stream<Item = Result<SearchPage>> + 'a {
        // Some(cursor) = page still to fetch, None = chain exhausted
        stream::try_unfold(Some(None::<String>), move |state| async move {
            let Some(cursor) = state else {
                return Ok(None);
            };
            let page = self.fetch_page(cursor.as_deref(), token, options).await?;
            let next = page.next_cursor().map(|n| Some(n.to_string()));
            Ok::<_, Error>(Some((page, next)))
        })
    }

    pub async fn fetch_all(&self, token: &AccessToken, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        self.pages(token, options)
            .try_fold(Vec::new(), |mut all, page| async move {
                all.extend(page.results);
                Ok(all)
            })
            .await
    }
}
