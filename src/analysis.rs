//! Optional title summarizer backed by a hosted model.
//!
//! The capability is decided once, when the analyzer is built: without a
//! credential there is simply no analyzer. Every runtime failure degrades to
//! `None`, never to an error for the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::types::AnalysisResult;

pub const KEY_VARS: [&str; 2] = ["BOOKSCOUT_AI_KEY", "GEMINI_API_KEY"];

#[async_trait]
pub trait TitleAnalyzer: Send + Sync {
    async fn analyze(&self, titles: &[String]) -> Option<AnalysisResult>;
}

pub struct GeminiAnalyzer {
    client: reqwest::Client,
    cfg: AnalysisConfig,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

impl GeminiAnalyzer {
    pub fn new(client: reqwest::Client, cfg: AnalysisConfig, api_key: String) -> Self {
        Self { client, cfg, api_key }
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", self.cfg.endpoint.trim_end_matches('/'), self.cfg.model)
    }

    async fn request(&self, prompt: &str) -> Result<AnalysisResult, AnalysisError> {
        let body = GenerateRequest {
            contents: [Content { parts: [Part { text: prompt }] }],
            generation_config: GenerationConfig { response_mime_type: "application/json" },
        };
        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AnalysisError::Status(resp.status()));
        }
        let reply: GenerateResponse = resp.json().await?;
        let text = reply
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or(AnalysisError::EmptyReply)?;
        parse_reply(&text, self.cfg.max_tags)
    }
}

#[async_trait]
impl TitleAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, titles: &[String]) -> Option<AnalysisResult> {
        if titles.is_empty() {
            return None;
        }
        let prompt = build_prompt(titles, self.cfg.max_titles);
        debug!(titles = titles.len(), model = %self.cfg.model, "requesting title analysis");
        match self.request(&prompt).await {
            Ok(r) => Some(r),
            Err(e) => {
                warn!(error = %e, "title analysis failed");
                None
            }
        }
    }
}

/// At most `max_titles` titles, one per line, with a note when more existed.
pub fn build_prompt(titles: &[String], max_titles: usize) -> String {
    let mut list = titles.iter().take(max_titles).map(|t| format!("- {t}")).collect::<Vec<_>>().join("\n");
    if titles.len() > max_titles {
        list.push_str(&format!("\n... and {} more", titles.len() - max_titles));
    }
    format!(
        "The following are titles of book sources (reader-app site adapters) from a listing page.\n\
         Summarize what kinds of sites they cover in one or two sentences and give up to 5 short tags.\n\
         Reply with JSON only: {{\"summary\": string, \"tags\": string[]}}.\n\n{list}"
    )
}

/// Accepts bare JSON or JSON wrapped in a markdown code fence.
pub fn parse_reply(text: &str, max_tags: usize) -> Result<AnalysisResult, AnalysisError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    let mut result: AnalysisResult = serde_json::from_str(body)?;
    result.tags.truncate(max_tags);
    Ok(result)
}

pub fn api_key_from_env() -> Option<String> {
    KEY_VARS
        .iter()
        .filter_map(|k| std::env::var(k).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// `None` when no credential is configured; the feature is then off for the
/// life of the process.
pub fn analyzer_from_env(cfg: &AnalysisConfig, client: reqwest::Client) -> Option<Arc<dyn TitleAnalyzer>> {
    match api_key_from_env() {
        Some(key) => {
            info!(model = %cfg.model, "title analysis enabled");
            Some(Arc::new(GeminiAnalyzer::new(client, cfg.clone(), key)))
        }
        None => {
            debug!("no {} set; title analysis disabled", KEY_VARS.join(" or "));
            None
        }
    }
}
