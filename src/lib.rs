pub mod auth;
pub mod bucket;
pub mod cache;
pub mod chart;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod rate_limit;
pub mod search;
pub mod state;
pub mod window;
pub mod worker;

pub use error::{Error, Result};
