use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ScoutConfig;
use crate::error::FetchError;

mod relay;
mod validator;

pub use relay::{outbound_url, RelayFetcher};
pub use validator::ContentValidator;

const USER_AGENT: &str = concat!("bookscout/", env!("CARGO_PKG_VERSION"));

/// Retrieves remote HTML through some relay mechanism. Implementations must
/// validate the payload before returning it.
#[async_trait]
pub trait Fetcher: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

pub fn http_client(cfg: &ScoutConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(cfg.request_timeout())
        .user_agent(USER_AGENT)
        .build()
        .context("building http client")
}

/// One fetcher per configured relay, in configuration order. All share one
/// connection pool.
pub fn from_config(cfg: &ScoutConfig) -> Result<Vec<Arc<dyn Fetcher>>> {
    let client = http_client(cfg)?;
    let validator = ContentValidator::new(cfg.min_content_len);
    Ok(cfg
        .relays
        .iter()
        .map(|r| Arc::new(RelayFetcher::new(r.clone(), client.clone(), validator.clone())) as Arc<dyn Fetcher>)
        .collect())
}
