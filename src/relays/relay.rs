use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::form_urlencoded;

use crate::config::{RelayConfig, RelayStyle};
use crate::error::FetchError;
use crate::relays::{ContentValidator, Fetcher};

/// A third-party relay that fetches the target on our behalf.
pub struct RelayFetcher {
    cfg: RelayConfig,
    client: reqwest::Client,
    validator: ContentValidator,
}

#[derive(Deserialize)]
struct Wrapped {
    contents: Option<String>,
}

impl RelayFetcher {
    pub fn new(cfg: RelayConfig, client: reqwest::Client, validator: ContentValidator) -> Self {
        Self { cfg, client, validator }
    }

    async fn body(&self, outbound: &str) -> Result<String, FetchError> {
        let relay = &self.cfg.name;
        let resp = self
            .client
            .get(outbound)
            .send()
            .await
            .map_err(|source| FetchError::Transport { relay: relay.clone(), source })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::RelayHttp { relay: relay.clone(), status });
        }
        let text = resp
            .text()
            .await
            .map_err(|source| FetchError::Transport { relay: relay.clone(), source })?;
        match self.cfg.style {
            RelayStyle::Passthrough => Ok(text),
            RelayStyle::JsonEnvelope => {
                let wrapped: Wrapped = serde_json::from_str(&text)
                    .map_err(|e| FetchError::Envelope { relay: relay.clone(), reason: e.to_string() })?;
                wrapped
                    .contents
                    .ok_or_else(|| FetchError::Envelope { relay: relay.clone(), reason: "missing `contents`".to_string() })
            }
        }
    }
}

#[async_trait]
impl Fetcher for RelayFetcher {
    fn name(&self) -> &str {
        &self.cfg.name
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let outbound = outbound_url(&self.cfg, url, current_millis());
        debug!(relay = %self.cfg.name, %outbound, "relay request");
        let body = self.body(&outbound).await?;
        self.validator
            .check(&body)
            .map_err(|reason| FetchError::InvalidContent { relay: self.cfg.name.clone(), reason })?;
        debug!(relay = %self.cfg.name, len = body.len(), "relay payload accepted");
        Ok(body)
    }
}

/// Endpoint prefix + percent-encoded target. Json-envelope relays cache
/// aggressively, so they also get a `t=<millis>` buster.
pub fn outbound_url(cfg: &RelayConfig, target: &str, now_ms: u128) -> String {
    let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
    let mut out = format!("{}{}", cfg.endpoint, encoded);
    if cfg.style == RelayStyle::JsonEnvelope {
        let sep = if out.contains('?') { '&' } else { '?' };
        out.push_str(&format!("{sep}t={now_ms}"));
    }
    out
}

fn current_millis() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::serve_once;
    use std::time::Duration;

    async fn relay_endpoint(status: u16, body: String) -> (String, tokio::sync::oneshot::Receiver<String>) {
        let (base, seen) = serve_once(status, "text/html; charset=utf-8", body).await;
        (format!("{base}/relay?url="), seen)
    }

    fn listing_html() -> String {
        let mut html = String::from("<html><body><ul>");
        for id in 1..=20 {
            html.push_str(&format!("<li><a href=\"/yuedu/shuyuan/content/id/{id}.html\">Source number {id}</a> 2024-01-{id:02}</li>"));
        }
        html.push_str("</ul></body></html>");
        html
    }

    fn fetcher(endpoint: &str, style: RelayStyle) -> RelayFetcher {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(5)).build().unwrap();
        RelayFetcher::new(RelayConfig::new("local", endpoint, style), client, ContentValidator::new(500))
    }

    #[test]
    fn passthrough_url_is_prefix_plus_encoded_target() {
        let cfg = RelayConfig::new("r", "https://relay.example/?url=", RelayStyle::Passthrough);
        let out = outbound_url(&cfg, "https://site.example/list.html?page=2", 42);
        assert_eq!(out, "https://relay.example/?url=https%3A%2F%2Fsite.example%2Flist.html%3Fpage%3D2");
    }

    #[test]
    fn envelope_url_gets_cache_buster() {
        let cfg = RelayConfig::new("r", "https://relay.example/get?url=", RelayStyle::JsonEnvelope);
        let out = outbound_url(&cfg, "https://site.example/", 1700000000000);
        assert!(out.starts_with("https://relay.example/get?url=https%3A%2F%2Fsite.example%2F"));
        assert!(out.ends_with("&t=1700000000000"));
    }

    #[tokio::test]
    async fn passthrough_returns_validated_body() {
        let html = listing_html();
        let (endpoint, seen) = relay_endpoint(200, html.clone()).await;
        let f = fetcher(&endpoint, RelayStyle::Passthrough);
        let body = f.fetch("https://site.example/index.html").await.unwrap();
        assert_eq!(body, html);
        let line = seen.await.unwrap();
        assert!(line.contains("/relay?url=https%3A%2F%2Fsite.example%2Findex.html"), "{line}");
    }

    #[tokio::test]
    async fn non_success_status_is_relay_http_error() {
        let (endpoint, _seen) = relay_endpoint(503, listing_html()).await;
        let f = fetcher(&endpoint, RelayStyle::Passthrough);
        let err = f.fetch("https://site.example/").await.unwrap_err();
        assert!(matches!(err, FetchError::RelayHttp { ref status, .. } if status.as_u16() == 503), "{err}");
    }

    #[tokio::test]
    async fn ok_status_with_captcha_page_is_invalid_content() {
        let (endpoint, _seen) = relay_endpoint(200, "<html>please verify you are human</html>".into()).await;
        let f = fetcher(&endpoint, RelayStyle::Passthrough);
        let err = f.fetch("https://site.example/").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidContent { .. }), "{err}");
    }

    #[tokio::test]
    async fn envelope_contents_are_unwrapped() {
        let html = listing_html();
        let body = serde_json::json!({ "contents": html, "status": { "http_code": 200 } }).to_string();
        let (endpoint, seen) = relay_endpoint(200, body).await;
        let f = fetcher(&endpoint, RelayStyle::JsonEnvelope);
        assert_eq!(f.fetch("https://site.example/").await.unwrap(), html);
        assert!(seen.await.unwrap().contains("&t="));
    }

    #[tokio::test]
    async fn envelope_without_contents_is_rejected() {
        let (endpoint, _seen) = relay_endpoint(200, r#"{"contents":null}"#.into()).await;
        let f = fetcher(&endpoint, RelayStyle::JsonEnvelope);
        let err = f.fetch("https://site.example/").await.unwrap_err();
        assert!(matches!(err, FetchError::Envelope { .. }), "{err}");
    }
}
