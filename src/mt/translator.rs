//! Machine Translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait for provider abstraction,
//! so the page pipeline can run against DeepL in production and a mock in tests
//! without knowing which one it talks to.
//!
//! # Example
//!
//! ```ignore
//! use notion_translator::mt::{DeeplTranslator, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = DeeplTranslator::from_env()?;
//!
//!     // Explicit source language
//!     let result = provider.translate("Hello, world!", Some("EN"), "JA").await?;
//!     println!("{}", result.text);
//!
//!     // Let the provider detect the source language
//!     let result = provider.translate("Bonjour", None, "en-US").await?;
//!     println!("{:?}", result.detected_source_language); // Some("FR")
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use async_trait::async_trait;

/// A translated text together with the source language the provider saw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    /// Reported by providers that detect the source language
    pub detected_source_language: Option<String>,
}

impl Translation {
    pub fn new(text: String) -> Self {
        Self {
            text,
            detected_source_language: None,
        }
    }
}

/// Generic trait for machine translation providers
///
/// All methods are async to support I/O-bound operations like network requests.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_locale` - Source language code, or `None` to let the provider detect it
    /// * `target_locale` - Target language code (e.g., "JA", "en-US")
    ///
    /// # Returns
    ///
    /// * `Ok(Translation)` - The translated text and, when detected, the source language
    /// * `Err(MtError)` - If translation fails
    async fn translate(
        &self,
        text: &str,
        source_locale: Option<&str>,
        target_locale: &str,
    ) -> MtResult<Translation>;

    /// Translate multiple strings in a single batch operation
    ///
    /// # Guarantees
    ///
    /// - Output order matches input order
    /// - Output length equals input length
    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: Option<&str>,
        target_locale: &str,
    ) -> MtResult<Vec<Translation>>;

    /// Get the name of this translation provider
    ///
    /// Used for logging to identify which provider handled a translation.
    fn provider_name(&self) -> &str;
}

/// Normalize a locale code by stripping region information
///
/// - `en-US` → `en`
/// - `PT-BR` → `pt`
/// - `JA` → `ja`
pub fn normalize_locale(locale: &str) -> String {
    locale.split('-').next().unwrap_or(locale).to_lowercase()
}

/// Validate that a locale code is in acceptable format
///
/// Checks that the locale code contains only alphanumeric characters,
/// hyphens, and underscores.
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}
