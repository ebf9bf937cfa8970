use crate::types::{Observation, Tool, ToolError};
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

// ---------------------------------------------------------------------------
// MediaWiki response shapes (only the fields we read)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryPages>,
}

#[derive(Debug, Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: std::collections::HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
}

// ---------------------------------------------------------------------------
// WikipediaTool
// ---------------------------------------------------------------------------

/// Wikipedia research via the MediaWiki API: one generator=search request
/// that returns the intro extract of the best-matching article.
pub struct WikipediaTool {
    client: reqwest::Client,
    endpoint: String,
}

impl WikipediaTool {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Point at a different MediaWiki instance (or a local stub).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for WikipediaTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Search Wikipedia and return the introduction of the best-matching \
         article. Input: a search phrase."
    }

    async fn execute(&self, input: &str) -> Result<Observation, ToolError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(ToolError::Failed("empty search phrase".to_string()));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", "1"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let parsed: QueryResponse = response.json().await?;
        let pages = parsed
            .query
            .map(|q| q.pages)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ToolError::Failed(format!("no results for '{query}'")))?;

        // gsrlimit=1 returns at most one page.
        let page = pages.into_values().next().ok_or_else(|| {
            ToolError::Failed(format!("no results for '{query}'"))
        })?;
        let extract = page
            .extract
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| ToolError::Failed(format!("'{}' has no extract", page.title)))?;

        Ok(Observation {
            text: format!("{}\n\n{}", page.title, extract),
            data: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_shape_parses() {
        let json = r#"{
            "batchcomplete": "",
            "query": {
                "pages": {
                    "1001": {
                        "pageid": 1001,
                        "ns": 0,
                        "title": "Quantum computing",
                        "index": 1,
                        "extract": "A quantum computer is a computer that..."
                    }
                }
            }
        }"#;
        let parsed: QueryResponse = serde_json::from_str(json).unwrap();
        let pages = parsed.query.unwrap().pages;
        assert_eq!(pages.len(), 1);
        let page = pages.values().next().unwrap();
        assert_eq!(page.title, "Quantum computing");
        assert!(page.extract.as_deref().unwrap().starts_with("A quantum"));
    }

    #[test]
    fn empty_response_shape_parses() {
        // A search with no hits omits "query" entirely.
        let parsed: QueryResponse = serde_json::from_str(r#"{"batchcomplete": ""}"#).unwrap();
        assert!(parsed.query.is_none());
    }
}
