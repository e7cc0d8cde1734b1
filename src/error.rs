use thiserror::Error;

// Every failure the pipeline can surface to its caller
#[derive(Error, Debug)]
pub enum Error {
    // Token exchange failed or returned something we could not use
    #[error("authentication failed: {0}")]
    Auth(String),

    // Search API answered with an error payload
    #[error("search api error: {0}")]
    SearchApi(String),

    #[error("malformed timestamp {0:?}")]
    MalformedTimestamp(String),

    #[error("malformed date {0:?}, expected YYYYMMDDHHmm")]
    MalformedDate(String),

    #[error("invalid time window: {from} is after {to}")]
    InvalidWindow { from: String, to: String },

    #[error("bucket width must be positive, got {0} minutes")]
    InvalidBucketWidth(i64),

    #[error("window spans {buckets} buckets, at most {max} allowed")]
    TooManyBuckets { buckets: i64, max: i64 },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("token store: {0}")]
    Storage(#[from] std::io::Error),

    #[error("configuration: {0}")]
    Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    // True when the caller sent something unusable (as opposed to upstream failing)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedDate(_)
                | Error::InvalidWindow { .. }
                | Error::InvalidBucketWidth(_)
                | Error::TooManyBuckets { .. }
        )
    }
}
