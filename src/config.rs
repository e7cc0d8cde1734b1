use clap::Parser;
use reqwest::Url;
use std::path::PathBuf;
use crate::error::{Error, Result};

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "geo-search-histogram")]
#[command(about = "Buckets geo-filtered archive search results into a time histogram")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Search API base url
    #[arg(long, default_value = "https://api.twitter.com")]
    pub api_base: String,

    // Optional cross-origin proxy prefixed to every API url
    // Example: "https://cors-anywhere.herokuapp.com/"
    #[arg(long)]
    pub proxy: Option<String>,

    // Search environment (label) name
    #[arg(short, long, default_value = "dev")]
    pub env_name: String,

    // Base64 encoded "key:secret" sent to the token endpoint
    #[arg(long, env = "GEO_SEARCH_AUTH_KEY", hide_env_values = true)]
    pub auth_key: String,

    // File the access token is persisted to
    #[arg(long, default_value = "token_store.json")]
    pub token_store: PathBuf,

    // Reuse a stored token instead of exchanging credentials every run
    #[arg(long, default_value_t = false)]
    pub reuse_token: bool,

    // Width of each histogram bucket in minutes
    #[arg(long, default_value_t = 20)]
    pub bucket_minutes: i64,

    // Results requested per page
    #[arg(long, default_value_t = 100)]
    pub max_results: u32,

    // Search radius around the point
    #[arg(long, default_value = "1mi")]
    pub radius: String,

    // Cache TTL in seconds
    #[arg(short, long, default_value_t = 30)]
    pub cache_ttl: u64,

    // Rate limit max requests per window
    #[arg(long, default_value_t = 10)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,
}

// Upstream urls derived from the args
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub token_url: Url,
    pub search_url: Url,
}

impl Endpoints {
    pub fn new(api_base: &str, proxy: Option<&str>, env_name: &str) -> Result<Self> {
        let prefix = format!("{}{}", proxy.unwrap_or(""), api_base.trim_end_matches('/'));
        let parse = |s: String| Url::parse(&s).map_err(|e| Error::Config(format!("bad url {s:?}: {e}")));

        Ok(Self {
            token_url: parse(format!("{prefix}/oauth2/token"))?,
            search_url: parse(format!("{prefix}/1.1/tweets/search/fullarchive/{env_name}.json"))?,
        })
    }

    pub fn from_args(args: &Args) -> Result<Self> {
        Self::new(&args.api_base, args.proxy.as_deref(), &args.env_name)
    }
}
