//! DeepL API provider for machine translation
//!
//! # Authentication
//!
//! The provider loads the API key from the `DEEPL_API_TOKEN` environment
//! variable. Keys of free developer accounts end in `:fx` and are routed to
//! the free endpoint automatically. Obtain a key from:
//! https://www.deepl.com/pro-api

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, Translation, normalize_locale, validate_locale};
use async_trait::async_trait;
use serde_json::json;

/// Environment variable holding the DeepL authentication key
pub const DEEPL_TOKEN_VAR: &str = "DEEPL_API_TOKEN";

const PRO_BASE_URL: &str = "https://api.deepl.com/v2";
const FREE_BASE_URL: &str = "https://api-free.deepl.com/v2";

/// DeepL API v2 provider
#[derive(Clone)]
pub struct DeeplTranslator {
    /// Authentication key
    api_key: String,
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Base URL, without the `/translate` suffix
    base_url: String,
}

impl DeeplTranslator {
    /// Maximum number of texts DeepL accepts per request
    const MAX_BATCH_SIZE: usize = 50;

    /// Status DeepL uses for an exhausted character quota
    const QUOTA_EXCEEDED: u16 = 456;

    /// Create a new provider with an explicit API key
    pub fn new(api_key: String) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = if api_key.ends_with(":fx") {
            FREE_BASE_URL
        } else {
            PRO_BASE_URL
        };

        Ok(Self {
            api_key,
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Create a provider from the `DEEPL_API_TOKEN` environment variable
    pub fn from_env() -> MtResult<Self> {
        let api_key = std::env::var(DEEPL_TOKEN_VAR).map_err(|_| {
            MtError::ConfigError(format!("{} environment variable not set", DEEPL_TOKEN_VAR))
        })?;

        Self::new(api_key)
    }

    /// Point the provider at a different API root (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// DeepL only accepts the bare language as a source (`EN`, not `EN-US`)
    fn source_code(source_locale: &str) -> String {
        normalize_locale(source_locale).to_uppercase()
    }

    fn target_code(target_locale: &str) -> String {
        target_locale.to_uppercase()
    }

    /// Translate a single chunk of texts via the API
    async fn translate_chunk(
        &self,
        texts: &[String],
        source_locale: Option<&str>,
        target_locale: &str,
    ) -> MtResult<Vec<Translation>> {
        let url = format!("{}/translate", self.base_url);

        let mut body = json!({
            "text": texts,
            "target_lang": Self::target_code(target_locale),
        });
        if let Some(source) = source_locale {
            body["source_lang"] = json!(Self::source_code(source));
        }

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(if status.as_u16() == Self::QUOTA_EXCEEDED {
                MtError::TranslationError(format!("DeepL quota exceeded: {}", error_text))
            } else if status.is_client_error() {
                MtError::ConfigError(format!("API client error ({}): {}", status, error_text))
            } else {
                MtError::TranslationError(format!("API server error ({}): {}", status, error_text))
            });
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            MtError::TranslationError(format!("Failed to parse API response: {}", e))
        })?;

        let translations = json["translations"].as_array().ok_or_else(|| {
            MtError::TranslationError(
                "Invalid API response: missing 'translations' array".to_string(),
            )
        })?;

        translations
            .iter()
            .map(|t| {
                let text = t["text"].as_str().ok_or_else(|| {
                    MtError::TranslationError(
                        "Invalid API response: missing 'text' field".to_string(),
                    )
                })?;
                Ok(Translation {
                    text: text.to_string(),
                    detected_source_language: t["detected_source_language"]
                        .as_str()
                        .map(str::to_string),
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for DeeplTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeeplTranslator")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for DeeplTranslator {
    async fn translate(
        &self,
        text: &str,
        source_locale: Option<&str>,
        target_locale: &str,
    ) -> MtResult<Translation> {
        if let Some(source) = source_locale {
            validate_locale(source)?;
        }
        validate_locale(target_locale)?;

        if text.is_empty() {
            return Ok(Translation::new(String::new()));
        }

        let results = self
            .translate_chunk(&[text.to_string()], source_locale, target_locale)
            .await?;

        results.into_iter().next().ok_or_else(|| {
            MtError::TranslationError("Invalid API response: no translation returned".to_string())
        })
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: Option<&str>,
        target_locale: &str,
    ) -> MtResult<Vec<Translation>> {
        if let Some(source) = source_locale {
            validate_locale(source)?;
        }
        validate_locale(target_locale)?;

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_results = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(Self::MAX_BATCH_SIZE) {
            let chunk_results = self
                .translate_chunk(chunk, source_locale, target_locale)
                .await?;
            if chunk_results.len() != chunk.len() {
                return Err(MtError::TranslationError(format!(
                    "Expected {} translations, got {}",
                    chunk.len(),
                    chunk_results.len()
                )));
            }
            all_results.extend(chunk_results);
        }

        Ok(all_results)
    }

    fn provider_name(&self) -> &str {
        "DeepL"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Initialization Tests ==========

    #[test]
    fn test_new_with_valid_key() {
        let provider = DeeplTranslator::new("test-api-key".to_string());
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().provider_name(), "DeepL");
    }

    #[test]
    fn test_new_with_empty_key() {
        match DeeplTranslator::new("".to_string()) {
            Err(MtError::ConfigError(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected ConfigError"),
        }
    }

    #[test]
    fn test_new_with_whitespace_key() {
        assert!(DeeplTranslator::new("   ".to_string()).is_err());
    }

    #[test]
    fn test_free_key_uses_free_endpoint() {
        let provider = DeeplTranslator::new("abc:fx".to_string()).unwrap();
        assert_eq!(provider.base_url(), FREE_BASE_URL);
        let provider = DeeplTranslator::new("abc".to_string()).unwrap();
        assert_eq!(provider.base_url(), PRO_BASE_URL);
    }

    #[test]
    fn test_with_base_url_trims_slash() {
        let provider = DeeplTranslator::new("k".to_string())
            .unwrap()
            .with_base_url("http://localhost:8080/v2/");
        assert_eq!(provider.base_url(), "http://localhost:8080/v2");
    }

    // ========== Language Code Tests ==========

    #[test]
    fn test_source_code_strips_region() {
        assert_eq!(DeeplTranslator::source_code("en-US"), "EN");
        assert_eq!(DeeplTranslator::source_code("ja"), "JA");
    }

    #[test]
    fn test_target_code_keeps_region() {
        assert_eq!(DeeplTranslator::target_code("en-us"), "EN-US");
        assert_eq!(DeeplTranslator::target_code("JA"), "JA");
    }

    // ========== Validation Tests ==========

    #[tokio::test]
    async fn test_translate_empty_text() {
        let provider = DeeplTranslator::new("test-key".to_string()).unwrap();
        let result = provider.translate("", Some("EN"), "JA").await.unwrap();
        assert_eq!(result.text, "");
    }

    #[tokio::test]
    async fn test_translate_invalid_target_locale() {
        let provider = DeeplTranslator::new("test-key".to_string()).unwrap();
        let result = provider.translate("hello", None, "invalid#code").await;
        assert!(matches!(result, Err(MtError::InvalidLocale(_))));
    }

    #[tokio::test]
    async fn test_batch_empty() {
        let provider = DeeplTranslator::new("test-key".to_string()).unwrap();
        let results = provider.translate_batch(&[], Some("EN"), "JA").await.unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_debug_output() {
        let provider = DeeplTranslator::new("secret-key".to_string()).unwrap();
        let debug_str = format!("{:?}", provider);
        assert!(debug_str.contains("***"));
        assert!(!debug_str.contains("secret-key"));
    }

    // ========== Integration Tests (require real API key) ==========

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_api_detects_source_language() {
        if std::env::var(DEEPL_TOKEN_VAR).is_err() {
            eprintln!("Skipping: {} not set", DEEPL_TOKEN_VAR);
            return;
        }

        let provider = DeeplTranslator::from_env().unwrap();
        let result = provider.translate("Hello", None, "JA").await.unwrap();
        println!("Translation: Hello → {}", result.text);
        assert!(!result.text.is_empty());
        assert_eq!(result.detected_source_language.as_deref(), Some("EN"));
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_api_batch_translation() {
        if std::env::var(DEEPL_TOKEN_VAR).is_err() {
            eprintln!("Skipping: {} not set", DEEPL_TOKEN_VAR);
            return;
        }

        let provider = DeeplTranslator::from_env().unwrap();
        let texts = vec!["Hello".to_string(), "Goodbye".to_string()];
        let results = provider
            .translate_batch(&texts, Some("EN"), "DE")
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        for (input, output) in texts.iter().zip(results.iter()) {
            println!("Translation: {} → {}", input, output.text);
            assert!(!output.text.is_empty());
        }
    }
}
