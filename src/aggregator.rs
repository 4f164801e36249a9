use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ScoutConfig;
use crate::error::ScrapeError;
use crate::extract::{AncestorText, ContextText, Extractor};
use crate::relays::{self, Fetcher};
use crate::types::ScrapeResult;

/// Aggregator owns the relay set and the extractor and turns a page number
/// into a [`ScrapeResult`].
pub struct Aggregator<C = AncestorText> {
    fetchers: Vec<Arc<dyn Fetcher>>,
    extractor: Extractor<C>,
    listing_url: String,
    site_root: String,
}

impl Aggregator<AncestorText> {
    pub fn from_config(cfg: &ScoutConfig) -> Result<Self> {
        let fetchers = relays::from_config(cfg)?;
        Ok(Self::new(fetchers, Extractor::from_config(cfg), &cfg.listing_url, &cfg.site_root))
    }
}

impl<C: ContextText> Aggregator<C> {
    pub fn new(fetchers: Vec<Arc<dyn Fetcher>>, extractor: Extractor<C>, listing_url: &str, site_root: &str) -> Self {
        Self { fetchers, extractor, listing_url: listing_url.to_string(), site_root: site_root.to_string() }
    }

    pub fn extractor(&self) -> &Extractor<C> { &self.extractor }

    /// Page 1 (and 0) is the bare listing URL; later pages add `page=N`.
    pub fn page_url(&self, page: u32) -> Result<String, ScrapeError> {
        if page <= 1 {
            return Ok(self.listing_url.clone());
        }
        let mut url = Url::parse(&self.listing_url)
            .map_err(|e| ScrapeError::InvalidTarget(format!("{}: {e}", self.listing_url)))?;
        url.query_pairs_mut().append_pair("page", &page.to_string());
        Ok(url.to_string())
    }

    /// Never fails outright: every failure mode ends up in the returned result.
    pub async fn fetch_page(&self, page: u32) -> ScrapeResult {
        match self.fetch_html(page).await {
            Ok(html) => self.extractor.parse(&html),
            Err(e) => {
                warn!(page, error = %e, "page fetch failed");
                ScrapeResult::Failure(e.to_string())
            }
        }
    }

    /// Races every relay for the page. Page 1 also races the first relay
    /// against the site root, which often survives when the listing URL is flaky.
    pub async fn fetch_html(&self, page: u32) -> Result<String, ScrapeError> {
        let target = self.page_url(page)?;
        let mut attempts: Vec<(Arc<dyn Fetcher>, String)> =
            self.fetchers.iter().map(|f| (Arc::clone(f), target.clone())).collect();
        if page <= 1 {
            if let Some(first) = self.fetchers.first() {
                attempts.push((Arc::clone(first), self.site_root.clone()));
            }
        }
        debug!(page, %target, attempts = attempts.len(), "racing relays");
        race(attempts).await
    }
}

/// First successful attempt wins; the rest are dropped unfinished. If all
/// fail, every failure message is kept, in completion order.
pub async fn race(attempts: Vec<(Arc<dyn Fetcher>, String)>) -> Result<String, ScrapeError> {
    let mut pending: FuturesUnordered<_> = attempts
        .into_iter()
        .map(|(fetcher, url)| async move {
            let res = fetcher.fetch(&url).await;
            (fetcher, url, res)
        })
        .collect();

    let mut failures = Vec::new();
    while let Some((fetcher, url, res)) = pending.next().await {
        match res {
            Ok(html) => {
                info!(relay = fetcher.name(), %url, "relay won the race");
                return Ok(html);
            }
            Err(e) => {
                warn!(relay = fetcher.name(), %url, error = %e, "relay attempt failed");
                failures.push(format!("{e} [{url}]"));
            }
        }
    }
    Err(ScrapeError::AllProxiesFailed(failures))
}
