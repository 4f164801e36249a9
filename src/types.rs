use serde::{Deserialize, Serialize, Serializer};

use crate::error::ScrapeError;

/// One scraped book-source entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSource {
    pub id: String,
    pub title: String,
    pub original_url: String,
    pub json_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_date: Option<String>,
}

/// Outcome of a page fetch or a parse. Serializes to the
/// `{ success, data, error? }` envelope consumed by presentation layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeResult {
    Success(Vec<BookSource>),
    Failure(String),
}

impl ScrapeResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeResult::Success(_))
    }

    /// Records on success, empty on failure.
    pub fn data(&self) -> &[BookSource] {
        match self {
            ScrapeResult::Success(v) => v,
            ScrapeResult::Failure(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ScrapeResult::Success(_) => None,
            ScrapeResult::Failure(e) => Some(e),
        }
    }
}

impl From<Result<Vec<BookSource>, ScrapeError>> for ScrapeResult {
    fn from(res: Result<Vec<BookSource>, ScrapeError>) -> Self {
        match res {
            Ok(v) => ScrapeResult::Success(v),
            Err(e) => ScrapeResult::Failure(e.to_string()),
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    success: bool,
    data: &'a [BookSource],
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl Serialize for ScrapeResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Envelope { success: self.is_success(), data: self.data(), error: self.error() }.serialize(serializer)
    }
}

/// Output of the optional title summarizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BookSource {
        BookSource {
            id: "4821".into(),
            title: "Mystery Tale".into(),
            original_url: "https://example.com/content/id/4821.html".into(),
            json_url: "https://example.com/json/4821.json".into(),
            update_date: None,
        }
    }

    #[test]
    fn success_envelope_has_no_error_field() {
        let v = serde_json::to_value(ScrapeResult::Success(vec![sample()])).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["data"][0]["originalUrl"], "https://example.com/content/id/4821.html");
        assert!(v["data"][0].get("updateDate").is_none());
        assert!(v.get("error").is_none());
    }

    #[test]
    fn failure_envelope_carries_empty_data() {
        let r = ScrapeResult::from(Err::<Vec<BookSource>, _>(ScrapeError::EmptyResult));
        assert!(r.data().is_empty());
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["data"].as_array().map(Vec::len), Some(0));
        assert!(v["error"].as_str().unwrap().contains("no book sources"));
    }
}
