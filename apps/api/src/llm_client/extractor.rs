//! Response Extractor: normalizes whatever envelope a backend contract returned
//! into plain text.
//!
//! Shapes are probed by priority; the first one that yields text wins:
//! 1. direct `text` (or the generateContent `candidates[0].content.parts[].text` accessor)
//! 2. `output[0].content[0].text` (responses contract)
//! 3. `candidates[0].output` (legacy generateText contract)
//! 4. the whole body, stringified
//!
//! An absent body (`null`) extracts to the empty string. Extraction never fails.

use serde_json::Value;

/// Returned only if the whole-body dump itself cannot be produced.
pub const EXTRACTION_FAILED: &str = "Error extracting response.";

/// Opaque body returned by a single strategy call. Callers never inspect it
/// directly; it always goes through [`extract_text`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse(Value);

impl RawResponse {
    pub fn new(body: Value) -> Self {
        Self(body)
    }

    /// The "no response" value.
    pub fn empty() -> Self {
        Self(Value::Null)
    }

    fn is_empty(&self) -> bool {
        self.0.is_null()
    }

    /// Mirrors the client libraries' `.text` accessor: a top-level `text` string,
    /// else the concatenated text parts of the first candidate.
    fn direct_text(&self) -> Option<String> {
        if let Some(text) = self.0.get("text").and_then(Value::as_str) {
            return Some(text.to_string());
        }

        let parts = self
            .0
            .get("candidates")?
            .get(0)?
            .get("content")?
            .get("parts")?
            .as_array()?;
        let joined: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect();
        Some(joined)
    }

    fn nested_output_text(&self) -> Option<&str> {
        self.0
            .get("output")?
            .get(0)?
            .get("content")?
            .get(0)?
            .get("text")?
            .as_str()
    }

    fn candidate_output(&self) -> Option<&Value> {
        self.0.get("candidates")?.get(0)?.get("output")
    }
}

impl From<Value> for RawResponse {
    fn from(body: Value) -> Self {
        Self::new(body)
    }
}

/// Normalizes a raw response into trimmed text. Pure: extracting the same
/// response twice yields the same string.
pub fn extract_text(response: &RawResponse) -> String {
    if response.is_empty() {
        return String::new();
    }

    if let Some(text) = response.direct_text().filter(|t| !t.is_empty()) {
        return text.trim().to_string();
    }

    if let Some(text) = response.nested_output_text() {
        return text.trim().to_string();
    }

    if let Some(output) = response.candidate_output() {
        return stringify(output).trim().to_string();
    }

    stringify(&response.0).trim().to_string()
}

/// String values render bare, everything else as compact JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| EXTRACTION_FAILED.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_text_is_trimmed() {
        let raw = RawResponse::new(json!({ "text": "  Key skills: Rust\n" }));
        assert_eq!(extract_text(&raw), "Key skills: Rust");
    }

    #[test]
    fn test_generate_content_parts_are_joined() {
        let raw = RawResponse::new(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "- Rust\n" }, { "text": "- SQL " }]
                }
            }]
        }));
        assert_eq!(extract_text(&raw), "- Rust\n- SQL");
    }

    #[test]
    fn test_nested_output_content_text() {
        let raw = RawResponse::new(json!({
            "id": "resp_1",
            "output": [{ "content": [{ "type": "output_text", "text": "\tStrong backend profile " }] }]
        }));
        assert_eq!(extract_text(&raw), "Strong backend profile");
    }

    #[test]
    fn test_candidates_output_string() {
        let raw = RawResponse::new(json!({ "candidates": [{ "output": " legacy answer " }] }));
        assert_eq!(extract_text(&raw), "legacy answer");
    }

    #[test]
    fn test_candidates_output_non_string_is_stringified() {
        let raw = RawResponse::new(json!({ "candidates": [{ "output": { "score": 3 } }] }));
        assert_eq!(extract_text(&raw), r#"{"score":3}"#);
    }

    #[test]
    fn test_unknown_shape_dumps_whole_body() {
        let raw = RawResponse::new(json!({ "answer": 42 }));
        assert_eq!(extract_text(&raw), r#"{"answer":42}"#);
    }

    #[test]
    fn test_bare_string_body() {
        let raw = RawResponse::new(json!("  plain body  "));
        assert_eq!(extract_text(&raw), "plain body");
    }

    #[test]
    fn test_absent_response_is_empty_string() {
        assert_eq!(extract_text(&RawResponse::empty()), "");
    }

    #[test]
    fn test_empty_direct_text_falls_through() {
        let raw = RawResponse::new(json!({
            "text": "",
            "candidates": [{ "output": "fallback" }]
        }));
        assert_eq!(extract_text(&raw), "fallback");
    }

    #[test]
    fn test_direct_text_wins_over_nested_output() {
        let raw = RawResponse::new(json!({
            "text": "direct",
            "output": [{ "content": [{ "text": "nested" }] }]
        }));
        assert_eq!(extract_text(&raw), "direct");
    }

    #[test]
    fn test_non_string_nested_text_is_skipped() {
        let raw = RawResponse::new(json!({
            "output": [{ "content": [{ "text": 7 }] }],
            "candidates": [{ "output": "from candidates" }]
        }));
        assert_eq!(extract_text(&raw), "from candidates");
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let raw = RawResponse::new(json!({ "output": [{ "content": [{ "text": " same " }] }] }));
        let first = extract_text(&raw);
        let second = extract_text(&raw);
        assert_eq!(first, second);
        assert_eq!(first, "same");
    }
}
