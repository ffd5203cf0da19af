//! Wire bodies for the three backend contracts.
//!
//! Only requests are typed. Responses stay as `serde_json::Value` inside
//! [`RawResponse`](super::extractor::RawResponse) because their envelope is
//! exactly what drifts between contract versions.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::ImagePayload;

// ────────────────────────────────────────────────────────────────────────────
// generateContent (model instance)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub role: &'static str,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl InlineData {
    pub fn from_image(image: &ImagePayload) -> Self {
        Self {
            mime_type: image.mime_type.clone(),
            data: BASE64.encode(&image.bytes),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
}

impl GenerateContentRequest {
    pub fn new(prompt: &str, image: Option<&ImagePayload>, max_output_tokens: Option<u32>) -> Self {
        let mut parts = vec![Part::Text {
            text: prompt.to_string(),
        }];
        if let Some(image) = image {
            parts.push(Part::InlineData {
                inline_data: InlineData::from_image(image),
            });
        }
        Self {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            generation_config: max_output_tokens
                .map(|max_output_tokens| GenerationConfig { max_output_tokens }),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// responses.generate
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ResponsesRequest {
    pub model: String,
    pub input: Vec<ResponsesMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ResponsesMessage {
    pub role: &'static str,
    pub content: Vec<ResponsesContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsesContent {
    InputText { text: String },
    InputImage { image_url: String },
}

impl ResponsesRequest {
    pub fn new(
        model: &str,
        prompt: &str,
        image: Option<&ImagePayload>,
        max_output_tokens: Option<u32>,
    ) -> Self {
        let mut content = vec![ResponsesContent::InputText {
            text: prompt.to_string(),
        }];
        if let Some(image) = image {
            content.push(ResponsesContent::InputImage {
                image_url: format!(
                    "data:{};base64,{}",
                    image.mime_type,
                    BASE64.encode(&image.bytes)
                ),
            });
        }
        Self {
            // The responses surface addresses models without the `models/` prefix.
            model: model.trim_start_matches("models/").to_string(),
            input: vec![ResponsesMessage {
                role: "user",
                content,
            }],
            max_output_tokens,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// generateText (legacy)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTextRequest {
    pub prompt: TextPrompt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct TextPrompt {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl GenerateTextRequest {
    pub fn new(prompt: &str, image: Option<&ImagePayload>, max_output_tokens: Option<u32>) -> Self {
        Self {
            prompt: TextPrompt {
                text: prompt.to_string(),
                inline_data: image.map(InlineData::from_image),
            },
            max_output_tokens,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Error envelope shared by all Google endpoints
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GoogleError {
    pub error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct GoogleErrorBody {
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}
