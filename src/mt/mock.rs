//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, API-free translator for testing
//! the page pipeline without requiring API keys or network access. Every call
//! is recorded so tests can assert on the language pair each request used.
//!
//! # Example
//!
//! ```ignore
//! use notion_translator::mt::{MachineTranslator, MockMode, MockTranslator};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", Some("EN"), "JA").await.unwrap();
//!     assert_eq!(result.text, "hello_JA");
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, Translation};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append target suffix: "hello" → "hello_JA"
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, target_locale) → translation, falling back to `Suffix`
    Mappings(HashMap<(String, String), String>),

    /// Simulate API errors
    Error(String),

    /// No-op: return input unchanged
    NoOp,
}

/// One recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub texts: Vec<String>,
    pub source_locale: Option<String>,
    pub target_locale: String,
}

/// Mock translator that simulates various translation scenarios
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Language reported when a call omits the source language
    detected_language: String,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
    detections: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockTranslator {
    /// Create a new MockTranslator with the given mode, detecting English
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            detected_language: "EN".to_string(),
            delay_ms: 0,
            detections: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a MockTranslator with simulated network delay
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::new(mode)
        }
    }

    /// Report `language` as the detected source of every undetermined call
    pub fn detecting(mut self, language: &str) -> Self {
        self.detected_language = language.to_string();
        self
    }

    /// Number of calls made without a source language
    pub fn detection_count(&self) -> usize {
        self.detections.load(Ordering::SeqCst)
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn record(&self, texts: &[String], source: Option<&str>, target: &str) {
        if source.is_none() {
            self.detections.fetch_add(1, Ordering::SeqCst);
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                texts: texts.to_vec(),
                source_locale: source.map(str::to_string),
                target_locale: target.to_string(),
            });
        }
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, source: Option<&str>, target: &str) -> MtResult<Translation> {
        let translated = match &self.mode {
            MockMode::Suffix => format!("{}_{}", text, target),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                map.get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target))
            }
            MockMode::Error(msg) => return Err(MtError::TranslationError(msg.clone())),
            MockMode::NoOp => text.to_string(),
        };

        Ok(Translation {
            text: translated,
            detected_source_language: source
                .is_none()
                .then(|| self.detected_language.clone()),
        })
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source_locale: Option<&str>,
        target_locale: &str,
    ) -> MtResult<Translation> {
        self.apply_delay().await;
        self.record(&[text.to_string()], source_locale, target_locale);
        self.apply_translation(text, source_locale, target_locale)
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: Option<&str>,
        target_locale: &str,
    ) -> MtResult<Vec<Translation>> {
        // Delay per batch, not per string
        self.apply_delay().await;
        self.record(texts, source_locale, target_locale);

        texts
            .iter()
            .map(|text| self.apply_translation(text, source_locale, target_locale))
            .collect()
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Suffix Mode Tests ==========

    #[tokio::test]
    async fn test_suffix_single_translation() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock.translate("hello", Some("EN"), "JA").await.unwrap();
        assert_eq!(result.text, "hello_JA");
        assert!(result.detected_source_language.is_none());
    }

    #[tokio::test]
    async fn test_suffix_batch_translation() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let texts = vec!["hello".to_string(), "world".to_string()];
        let results = mock.translate_batch(&texts, Some("EN"), "DE").await.unwrap();
        let texts: Vec<_> = results.into_iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["hello_DE", "world_DE"]);
    }

    // ========== Detection Tests ==========

    #[tokio::test]
    async fn test_detection_reports_configured_language() {
        let mock = MockTranslator::new(MockMode::Suffix).detecting("JA");
        let result = mock.translate("こんにちは", None, "en-US").await.unwrap();
        assert_eq!(result.detected_source_language.as_deref(), Some("JA"));
        assert_eq!(mock.detection_count(), 1);
    }

    #[tokio::test]
    async fn test_explicit_source_is_not_a_detection() {
        let mock = MockTranslator::new(MockMode::Suffix);
        mock.translate("a", Some("EN"), "JA").await.unwrap();
        mock.translate_batch(&["b".to_string()], Some("EN"), "JA")
            .await
            .unwrap();
        assert_eq!(mock.detection_count(), 0);
    }

    #[tokio::test]
    async fn test_calls_are_recorded_in_order() {
        let mock = MockTranslator::new(MockMode::NoOp);
        mock.translate("first", None, "en-US").await.unwrap();
        mock.translate("second", Some("JA"), "en-US").await.unwrap();
        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].source_locale, None);
        assert_eq!(calls[1].source_locale.as_deref(), Some("JA"));
        assert_eq!(calls[1].texts, vec!["second".to_string()]);
    }

    #[tokio::test]
    async fn test_clones_share_counters() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let clone = mock.clone();
        clone.translate("x", None, "JA").await.unwrap();
        assert_eq!(mock.detection_count(), 1);
    }

    // ========== Mapping Mode Tests ==========

    #[tokio::test]
    async fn test_mapping_single_translation() {
        let mut map = HashMap::new();
        map.insert(("hello".to_string(), "FR".to_string()), "bonjour".to_string());

        let mock = MockTranslator::new(MockMode::Mappings(map));
        let result = mock.translate("hello", Some("EN"), "FR").await.unwrap();
        assert_eq!(result.text, "bonjour");
    }

    #[tokio::test]
    async fn test_mapping_fallback_to_suffix() {
        let mock = MockTranslator::new(MockMode::Mappings(HashMap::new()));
        let result = mock.translate("unknown", Some("EN"), "FR").await.unwrap();
        assert_eq!(result.text, "unknown_FR");
    }

    // ========== Error Mode Tests ==========

    #[tokio::test]
    async fn test_error_mode_returns_error() {
        let mock = MockTranslator::new(MockMode::Error("API unavailable".to_string()));
        match mock.translate("hello", Some("EN"), "FR").await {
            Err(MtError::TranslationError(msg)) => assert_eq!(msg, "API unavailable"),
            _ => panic!("Expected TranslationError"),
        }
    }

    #[tokio::test]
    async fn test_error_mode_batch_fails() {
        let mock = MockTranslator::new(MockMode::Error("Network error".to_string()));
        let result = mock.translate_batch(&["hello".to_string()], None, "FR").await;
        assert!(result.is_err());
    }

    // ========== NoOp / Delay Tests ==========

    #[tokio::test]
    async fn test_noop_returns_unchanged() {
        let mock = MockTranslator::new(MockMode::NoOp);
        let result = mock.translate("Hello world", Some("EN"), "FR").await.unwrap();
        assert_eq!(result.text, "Hello world");
    }

    #[tokio::test]
    async fn test_delay_adds_latency() {
        let mock = MockTranslator::with_delay(MockMode::Suffix, 50);
        let start = std::time::Instant::now();
        let _ = mock.translate("hello", Some("EN"), "FR").await.unwrap();
        assert!(start.elapsed().as_millis() >= 50);
    }

    #[test]
    fn test_provider_name() {
        let mock = MockTranslator::new(MockMode::Suffix);
        assert_eq!(mock.provider_name(), "Mock Translator");
    }
}
