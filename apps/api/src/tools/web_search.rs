//! Web lookup through the DuckDuckGo instant-answer API.
//!
//! Uses its own short-timeout client and always returns a string: the abstract,
//! the first related topic, a fixed "no result" line, or a failure sentence.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

pub const DEFAULT_WEB_SEARCH_URL: &str = "https://api.duckduckgo.com/";
pub const NO_RESULT: &str = "No concise web search result found.";
const MAX_TOPIC_CHARS: usize = 1200;

#[derive(Clone)]
pub struct WebSearch {
    client: Client,
    endpoint: String,
}

impl WebSearch {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.to_string(),
        })
    }

    pub async fn search(&self, query: &str) -> String {
        match self.fetch(query).await {
            Ok(body) => summarize_instant_answer(&body),
            Err(e) => {
                warn!("Web search for {query:?} failed: {e}");
                format!("Web search failed: {e}")
            }
        }
    }

    async fn fetch(&self, query: &str) -> Result<Value, reqwest::Error> {
        debug!("Web search: {query:?}");
        self.client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

/// Picks the most useful text out of an instant-answer body.
pub fn summarize_instant_answer(body: &Value) -> String {
    if let Some(abstract_text) = body
        .get("AbstractText")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        return abstract_text.to_string();
    }

    if let Some(first) = body
        .get("RelatedTopics")
        .and_then(Value::as_array)
        .and_then(|topics| topics.first())
    {
        let rendered = match first {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return rendered.chars().take(MAX_TOPIC_CHARS).collect();
    }

    NO_RESULT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_abstract_text_wins() {
        let body = json!({
            "AbstractText": "Rust is a systems programming language.",
            "RelatedTopics": [{ "Text": "ignored" }]
        });
        assert_eq!(
            summarize_instant_answer(&body),
            "Rust is a systems programming language."
        );
    }

    #[test]
    fn test_first_related_topic_when_no_abstract() {
        let body = json!({
            "AbstractText": "",
            "RelatedTopics": [{ "Text": "Data engineering" }, { "Text": "second" }]
        });
        let summary = summarize_instant_answer(&body);
        assert!(summary.contains("Data engineering"));
        assert!(!summary.contains("second"));
    }

    #[test]
    fn test_related_topic_is_truncated() {
        let long = "x".repeat(5000);
        let body = json!({ "RelatedTopics": [long] });
        assert_eq!(summarize_instant_answer(&body).chars().count(), MAX_TOPIC_CHARS);
    }

    #[test]
    fn test_empty_body_is_no_result() {
        let body = json!({ "AbstractText": "", "RelatedTopics": [] });
        assert_eq!(summarize_instant_answer(&body), NO_RESULT);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_degrades_to_failure_sentence() {
        let search = WebSearch::new("http://127.0.0.1:9/", Duration::from_millis(500)).unwrap();
        let result = search.search("rust jobs").await;
        assert!(result.starts_with("Web search failed:"), "got {result}");
    }
}
