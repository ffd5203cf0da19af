use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{
    LlmSettings, Strategy, DEFAULT_BASE_URL, TEXT_MODEL, VISION_MAX_OUTPUT_TOKENS, VISION_MODEL,
};
use crate::tools::web_search::DEFAULT_WEB_SEARCH_URL;

/// Application configuration loaded from environment variables.
///
/// Nothing is required: a missing `GEMINI_API_KEY` is a valid state that every
/// model-backed operation reports as a configuration message.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub text_model: String,
    pub vision_model: String,
    pub vision_max_output_tokens: u32,
    /// Backend contracts the vision chain may use, in priority order.
    pub strategies: Vec<Strategy>,
    pub gemini_timeout: Duration,
    pub tesseract_bin: String,
    pub upload_dir: PathBuf,
    pub web_search_url: String,
    pub web_search_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            gemini_api_key: lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()),
            gemini_base_url: var("GEMINI_BASE_URL", DEFAULT_BASE_URL),
            text_model: var("GEMINI_TEXT_MODEL", TEXT_MODEL),
            vision_model: var("GEMINI_VISION_MODEL", VISION_MODEL),
            vision_max_output_tokens: var(
                "GEMINI_VISION_MAX_OUTPUT_TOKENS",
                &VISION_MAX_OUTPUT_TOKENS.to_string(),
            )
            .parse()
            .context("GEMINI_VISION_MAX_OUTPUT_TOKENS must be a positive integer")?,
            strategies: parse_strategies(&var(
                "GEMINI_STRATEGIES",
                "model_instance,responses,legacy_generate_text",
            ))?,
            gemini_timeout: Duration::from_secs(
                var("GEMINI_TIMEOUT_SECS", "120")
                    .parse()
                    .context("GEMINI_TIMEOUT_SECS must be a number of seconds")?,
            ),
            tesseract_bin: var("TESSERACT_BIN", "tesseract"),
            upload_dir: PathBuf::from(var("UPLOAD_DIR", "data/uploads")),
            web_search_url: var("WEB_SEARCH_URL", DEFAULT_WEB_SEARCH_URL),
            web_search_timeout: Duration::from_secs(
                var("WEB_SEARCH_TIMEOUT_SECS", "6")
                    .parse()
                    .context("WEB_SEARCH_TIMEOUT_SECS must be a number of seconds")?,
            ),
            port: var("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG", "info"),
        })
    }

    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            api_key: self.gemini_api_key.clone(),
            text_model: self.text_model.clone(),
            vision_model: self.vision_model.clone(),
            vision_max_output_tokens: Some(self.vision_max_output_tokens),
        }
    }
}

fn parse_strategies(raw: &str) -> Result<Vec<Strategy>> {
    let parsed = raw
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<Strategy>().map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()
        .context("Invalid GEMINI_STRATEGIES")?;
    Ok(Strategy::in_priority_order(&parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_from(&[]).unwrap();
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.text_model, "models/gemini-2.5-flash");
        assert_eq!(config.vision_model, "models/gemini-2.5-flash-image");
        assert_eq!(config.vision_max_output_tokens, 600);
        assert_eq!(config.strategies, Strategy::PRIORITY.to_vec());
        assert_eq!(config.web_search_timeout, Duration::from_secs(6));
        assert_eq!(config.upload_dir, PathBuf::from("data/uploads"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_blank_api_key_is_treated_as_missing() {
        let config = config_from(&[("GEMINI_API_KEY", "   ")]).unwrap();
        assert!(config.gemini_api_key.is_none());
        assert!(config.llm_settings().api_key.is_none());
    }

    #[test]
    fn test_strategies_are_reordered_by_priority() {
        let config = config_from(&[("GEMINI_STRATEGIES", "legacy_generate_text, model_instance")])
            .unwrap();
        assert_eq!(
            config.strategies,
            vec![Strategy::ModelInstance, Strategy::LegacyGenerateText]
        );
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let err = config_from(&[("GEMINI_STRATEGIES", "model_instance,telepathy")]).unwrap_err();
        assert!(format!("{err:#}").contains("telepathy"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(config_from(&[("PORT", "not-a-port")]).is_err());
    }
}
