use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::config::ScoutConfig;
use crate::error::ScrapeError;
use crate::types::{BookSource, ScrapeResult};

mod context;
mod dates;

pub use context::{AncestorText, ContextText};
pub use dates::find_date;

/// Link shape of a single book-source page; group 1 is the id.
pub(crate) static RECORD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"content/id/(\d+)\.html").expect("hardcoded regex pattern is valid"));

/// Turns a listing page into ordered, de-duplicated [`BookSource`] records.
/// Pure: no I/O, no state carried between calls.
#[derive(Debug, Clone)]
pub struct Extractor<C = AncestorText> {
    site_root: String,
    base: Option<Url>,
    json_base: String,
    context: C,
}

impl Extractor<AncestorText> {
    pub fn new(site_root: &str, json_base: &str) -> Self {
        Self::with_context(site_root, json_base, AncestorText::default())
    }

    pub fn from_config(cfg: &ScoutConfig) -> Self {
        Self::with_context(
            &cfg.site_root,
            &cfg.json_base,
            AncestorText { depth: cfg.context_depth, max_chars: cfg.context_max_chars },
        )
    }
}

impl<C: ContextText> Extractor<C> {
    pub fn with_context(site_root: &str, json_base: &str, context: C) -> Self {
        Self {
            site_root: site_root.to_string(),
            base: Url::parse(site_root).ok(),
            json_base: json_base.trim_end_matches('/').to_string(),
            context,
        }
    }

    pub fn parse(&self, html: &str) -> ScrapeResult {
        self.extract(html).into()
    }

    pub fn extract(&self, html: &str) -> Result<Vec<BookSource>, ScrapeError> {
        let anchors = Selector::parse("a").map_err(|e| ScrapeError::DocumentParse(e.to_string()))?;
        let doc = Html::parse_document(html);

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for a in doc.select(&anchors) {
            let Some(href) = a.value().attr("href") else { continue };
            let Some(caps) = RECORD_LINK.captures(href) else { continue };
            let id = caps[1].to_string();
            if seen.contains(&id) {
                continue;
            }

            let mut title = collapse_ws(&a.text().collect::<String>());
            if title.is_empty() {
                title = format!("Source {id}");
            }
            let update_date = self.context.scan(a, &find_date);

            out.push(BookSource {
                original_url: self.resolve(href),
                json_url: format!("{}/{}.json", self.json_base, id),
                id: id.clone(),
                title,
                update_date,
            });
            seen.insert(id);
        }

        debug!(records = out.len(), "extracted listing page");
        if out.is_empty() {
            return Err(ScrapeError::EmptyResult);
        }
        Ok(out)
    }

    /// Absolute page URL for `href`. Hrefs the url parser rejects are kept
    /// when already absolute, else glued onto the site root.
    fn resolve(&self, href: &str) -> String {
        if let Some(joined) = self.base.as_ref().and_then(|b| b.join(href).ok()) {
            return joined.to_string();
        }
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        format!("{}/{}", self.site_root.trim_end_matches('/'), href.trim_start_matches('/'))
    }
}

/// Runs of whitespace become one space; ends trimmed.
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
