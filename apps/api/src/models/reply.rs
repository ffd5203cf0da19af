use serde::Serialize;

use crate::analysis::orchestrator::AnalysisError;
use crate::llm_client::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Ok,
    Error,
}

/// Rendered outcome of an LLM-backed operation. Failures are delivered as a
/// readable sentence plus a machine-readable `error_kind`, never as an HTTP error.
#[derive(Debug, Clone, Serialize)]
pub struct TextReply {
    pub text: String,
    pub status: ReplyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

impl TextReply {
    pub fn ok(text: String) -> Self {
        Self {
            text,
            status: ReplyStatus::Ok,
            error_kind: None,
        }
    }

    pub fn error(kind: &'static str, text: String) -> Self {
        Self {
            text,
            status: ReplyStatus::Error,
            error_kind: Some(kind),
        }
    }
}

impl From<Result<String, LlmError>> for TextReply {
    fn from(result: Result<String, LlmError>) -> Self {
        match result {
            Ok(text) => TextReply::ok(text),
            Err(e) => TextReply::error(e.kind(), e.to_string()),
        }
    }
}

impl From<Result<String, AnalysisError>> for TextReply {
    fn from(result: Result<String, AnalysisError>) -> Self {
        match result {
            Ok(text) => TextReply::ok(text),
            Err(e) => TextReply::error(e.kind(), e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_reply_omits_error_kind() {
        let json = serde_json::to_value(TextReply::from(Ok::<_, LlmError>("hi".to_string()))).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["text"], "hi");
        assert!(json.get("error_kind").is_none());
    }

    #[test]
    fn test_error_reply_carries_kind_and_sentence() {
        let reply = TextReply::from(Err::<String, _>(AnalysisError::RecognitionEmpty));
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error_kind"], "recognition_empty");
        assert!(reply.text.contains("clearer image"));
    }

    #[test]
    fn test_wrapped_llm_error_keeps_its_kind() {
        let reply = TextReply::from(Err::<String, _>(AnalysisError::Llm(
            LlmError::ConfigurationMissing,
        )));
        assert_eq!(reply.error_kind, Some("configuration_missing"));
        assert!(reply.text.contains("GEMINI_API_KEY"));
    }
}
