pub mod aggregator;
pub mod analysis;
pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod logging;
pub mod relays;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::aggregator::Aggregator;
    pub use crate::analysis::TitleAnalyzer;
    pub use crate::config::{RelayConfig, RelayStyle, ScoutConfig};
    pub use crate::error::{FetchError, ScrapeError};
    pub use crate::extract::Extractor;
    pub use crate::relays::Fetcher;
    pub use crate::types::{AnalysisResult, BookSource, ScrapeResult};
    pub use crate::BookScout;
}

use anyhow::Result;
use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::analysis::TitleAnalyzer;
use crate::config::ScoutConfig;
use crate::types::{AnalysisResult, BookSource, ScrapeResult};

/// Library entry point. Owns the relay race and, when a credential was
/// present at construction, the title analyzer.
pub struct BookScout {
    aggregator: Aggregator,
    analyzer: Option<Arc<dyn TitleAnalyzer>>,
}

impl BookScout {
    /// Builds relays from `config`; the analyzer is enabled iff an API key is
    /// in the environment right now.
    pub fn new(config: ScoutConfig) -> Result<Self> {
        let aggregator = Aggregator::from_config(&config)?;
        let client = relays::http_client(&config)?;
        let analyzer = analysis::analyzer_from_env(&config.analysis, client);
        Ok(Self { aggregator, analyzer })
    }

    pub fn with_parts(aggregator: Aggregator, analyzer: Option<Arc<dyn TitleAnalyzer>>) -> Self {
        Self { aggregator, analyzer }
    }

    pub fn can_analyze(&self) -> bool { self.analyzer.is_some() }

    /// Fetch and extract one listing page. Always resolves; failures are in the result.
    pub async fn fetch_page(&self, page: u32) -> ScrapeResult {
        self.aggregator.fetch_page(page).await
    }

    /// Extract records from HTML obtained elsewhere (saved pages, fixtures).
    pub fn parse_html(&self, html: &str) -> ScrapeResult {
        self.aggregator.extractor().parse(html)
    }

    /// Summarize the titles of `sources`. `None` when analysis is disabled or fails.
    pub async fn analyze(&self, sources: &[BookSource]) -> Option<AnalysisResult> {
        let analyzer = self.analyzer.as_ref()?;
        let titles: Vec<String> = sources.iter().map(|s| s.title.clone()).collect();
        analyzer.analyze(&titles).await
    }
}
