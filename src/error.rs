use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single relay attempt. Never leaves the aggregator; each one
/// becomes a fragment of [`ScrapeError::AllProxiesFailed`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{relay}: relay returned HTTP {status}")]
    RelayHttp { relay: String, status: StatusCode },
    #[error("{relay}: invalid content ({reason})")]
    InvalidContent { relay: String, reason: String },
    #[error("{relay}: request failed: {source}")]
    Transport {
        relay: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{relay}: unusable envelope: {reason}")]
    Envelope { relay: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("all relays failed: {}", .0.join("; "))]
    AllProxiesFailed(Vec<String>),
    #[error("page parsed but no book sources were found")]
    EmptyResult,
    #[error("failed to parse document: {0}")]
    DocumentParse(String),
    #[error("invalid target url: {0}")]
    InvalidTarget(String),
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("analysis endpoint returned HTTP {0}")]
    Status(StatusCode),
    #[error("model reply had no text")]
    EmptyReply,
    #[error("model reply was not the expected json: {0}")]
    Json(#[from] serde_json::Error),
}
