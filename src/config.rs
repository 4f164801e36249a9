use anyhow::{anyhow, bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_SITE_ROOT: &str = "https://www.yckceo.com";
pub const DEFAULT_LISTING_URL: &str = "https://www.yckceo.com/yuedu/shuyuan/index.html";
pub const DEFAULT_JSON_BASE: &str = "https://www.yckceo.com/yuedu/shuyuans/json/id";

/// Payloads shorter than this (in characters) are treated as relay error pages.
pub const DEFAULT_MIN_CONTENT_LEN: usize = 500;
/// Ancestors above the parent are only searched for dates while their text stays under this size.
pub const DEFAULT_CONTEXT_MAX_CHARS: usize = 1000;
pub const DEFAULT_CONTEXT_DEPTH: usize = 2;
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;

/// How a relay hands back the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelayStyle {
    /// Body is the raw upstream HTML.
    Passthrough,
    /// Body is `{"contents": "<html>"}`.
    JsonEnvelope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    pub name: String,
    /// Prefix; the percent-encoded target URL is appended to it.
    pub endpoint: String,
    pub style: RelayStyle,
}

impl RelayConfig {
    pub fn new(name: &str, endpoint: &str, style: RelayStyle) -> Self {
        Self { name: name.to_string(), endpoint: endpoint.to_string(), style }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub endpoint: String,
    pub model: String,
    pub max_titles: usize,
    pub max_tags: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            model: "gemini-2.5-flash".to_string(),
            max_titles: 50,
            max_tags: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub site_root: String,
    pub listing_url: String,
    pub json_base: String,
    pub min_content_len: usize,
    pub context_max_chars: usize,
    pub context_depth: usize,
    pub request_timeout_ms: u64,
    pub relays: Vec<RelayConfig>,
    pub analysis: AnalysisConfig,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            site_root: DEFAULT_SITE_ROOT.to_string(),
            listing_url: DEFAULT_LISTING_URL.to_string(),
            json_base: DEFAULT_JSON_BASE.to_string(),
            min_content_len: DEFAULT_MIN_CONTENT_LEN,
            context_max_chars: DEFAULT_CONTEXT_MAX_CHARS,
            context_depth: DEFAULT_CONTEXT_DEPTH,
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            relays: default_relays(),
            analysis: AnalysisConfig::default(),
        }
    }
}

pub fn default_relays() -> Vec<RelayConfig> {
    vec![
        RelayConfig::new("corsproxy", "https://corsproxy.io/?url=", RelayStyle::Passthrough),
        RelayConfig::new("allorigins", "https://api.allorigins.win/get?url=", RelayStyle::JsonEnvelope),
        RelayConfig::new("codetabs", "https://api.codetabs.com/v1/proxy?quest=", RelayStyle::Passthrough),
    ]
}

impl ScoutConfig {
    /// Explicit file, else `<config dir>/bookscout.toml` if present, else defaults.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        cfg.apply_env_from(|k| std::env::var(k).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config: {}", path.display()))
    }

    /// `BOOKSCOUT_*` overrides read through `lookup`. Blank or unparseable
    /// values leave the current setting alone.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(u) = lookup("BOOKSCOUT_LISTING_URL") {
            if !u.trim().is_empty() { self.listing_url = u.trim().to_string(); }
        }
        self.min_content_len = parse_var(&lookup, "BOOKSCOUT_MIN_CONTENT_LEN").unwrap_or(self.min_content_len);
        self.context_max_chars = parse_var(&lookup, "BOOKSCOUT_CONTEXT_MAX_CHARS").unwrap_or(self.context_max_chars);
        self.request_timeout_ms = parse_var(&lookup, "BOOKSCOUT_TIMEOUT_MS").unwrap_or(self.request_timeout_ms);
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("site_root", &self.site_root), ("listing_url", &self.listing_url), ("json_base", &self.json_base)] {
            Url::parse(value).map_err(|e| anyhow!("{field} is not a valid url ({value}): {e}"))?;
        }
        if self.relays.is_empty() {
            bail!("at least one relay must be configured");
        }
        if let Some(r) = self.relays.iter().find(|r| r.endpoint.trim().is_empty()) {
            bail!("relay `{}` has an empty endpoint", r.name);
        }
        if self.context_depth == 0 {
            bail!("context_depth must be at least 1");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse().ok())
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "bookscout", "bookscout").map(|p| p.config_dir().join("bookscout.toml"))
}
