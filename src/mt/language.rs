//! Language codes and the per-run language pair
//!
//! A run either starts with an explicit pair (CLI) or discovers it from the
//! first text it translates (server). Either way the pair lives in a
//! [`LanguageContext`] owned by that run and is never re-detected once pinned.

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, normalize_locale};
use icu_locale::Locale;
use tracing::debug;

/// Source languages accepted by DeepL
pub const SUPPORTED_SOURCE_LANGUAGES: &[&str] = &[
    "BG", // Bulgarian
    "CS", // Czech
    "DA", // Danish
    "DE", // German
    "EL", // Greek
    "EN", // English
    "ES", // Spanish
    "ET", // Estonian
    "FI", // Finnish
    "FR", // French
    "HU", // Hungarian
    "ID", // Indonesian
    "IT", // Italian
    "JA", // Japanese
    "LT", // Lithuanian
    "LV", // Latvian
    "NL", // Dutch
    "PL", // Polish
    "PT", // Portuguese (all varieties)
    "RO", // Romanian
    "RU", // Russian
    "SK", // Slovak
    "SL", // Slovenian
    "SV", // Swedish
    "TR", // Turkish
    "ZH", // Chinese
];

/// Target languages accepted by DeepL
pub const SUPPORTED_TARGET_LANGUAGES: &[&str] = &[
    "BG", "CS", "DA", "DE", "EL", "EN-GB", "EN-US", "ES", "ET", "FI", "FR", "HU", "ID", "IT",
    "JA", "LT", "LV", "NL", "PL", "PT-PT", "PT-BR", "RO", "RU", "SK", "SL", "SV", "TR", "ZH",
];

/// Parse a BCP 47 language tag into DeepL's upper-case form (`en-us` → `EN-US`)
pub fn canonical_language(code: &str) -> MtResult<String> {
    let locale: Locale = code.trim().parse().map_err(|e| {
        MtError::InvalidLocale(format!("Failed to parse language code '{}': {}", code, e))
    })?;

    let mut canonical = locale.id.language.as_str().to_uppercase();
    if let Some(region) = locale.id.region {
        canonical.push('-');
        canonical.push_str(&region.as_str().to_uppercase());
    }
    Ok(canonical)
}

fn validate_against(code: &str, supported: &[&str]) -> MtResult<String> {
    let canonical = canonical_language(code)?;
    if supported.contains(&canonical.as_str()) {
        Ok(canonical)
    } else {
        Err(MtError::InvalidLocale(format!(
            "{} is not a supported language code. Pass any of {}",
            canonical,
            supported.join(",").to_lowercase()
        )))
    }
}

/// Validate and canonicalize a `--from` language
pub fn validate_source_language(code: &str) -> MtResult<String> {
    validate_against(code, SUPPORTED_SOURCE_LANGUAGES)
}

/// Validate and canonicalize a `--to` language
pub fn validate_target_language(code: &str) -> MtResult<String> {
    validate_against(code, SUPPORTED_TARGET_LANGUAGES)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// How a detected source language decides the pair
///
/// Pages written in the primary language are translated into its counterpart;
/// everything else is translated into the fallback target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRule {
    /// Target of the probe request that reveals the source language
    pub probe_target: String,
    pub primary_source: String,
    pub primary_target: String,
    pub fallback_target: String,
}

impl Default for DetectionRule {
    fn default() -> Self {
        Self {
            probe_target: "en-US".to_string(),
            primary_source: "EN".to_string(),
            primary_target: "JA".to_string(),
            fallback_target: "en-US".to_string(),
        }
    }
}

impl DetectionRule {
    pub fn pair_for(&self, detected: &str) -> LanguagePair {
        if normalize_locale(detected) == normalize_locale(&self.primary_source) {
            LanguagePair::new(self.primary_source.clone(), self.primary_target.clone())
        } else {
            LanguagePair::new(detected.to_uppercase(), self.fallback_target.clone())
        }
    }
}

/// Language state of a single translation run
#[derive(Debug, Clone)]
pub struct LanguageContext {
    pair: Option<LanguagePair>,
    rule: DetectionRule,
    /// Text to detect from when a pair is needed before any page text was seen
    hint: Option<String>,
    detections: usize,
}

impl LanguageContext {
    /// Undetermined pair, discovered on first use
    pub fn auto() -> Self {
        Self {
            pair: None,
            rule: DetectionRule::default(),
            hint: None,
            detections: 0,
        }
    }

    /// Explicit pair; no detection request is ever made
    pub fn fixed(pair: LanguagePair) -> Self {
        Self {
            pair: Some(pair),
            ..Self::auto()
        }
    }

    pub fn with_rule(mut self, rule: DetectionRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn pair(&self) -> Option<&LanguagePair> {
        self.pair.as_ref()
    }

    pub fn is_pinned(&self) -> bool {
        self.pair.is_some()
    }

    /// Number of detection requests this run has issued (at most one)
    pub fn detections(&self) -> usize {
        self.detections
    }

    /// Return the pinned pair, detecting it from the first non-blank sample if needed
    pub async fn ensure_pinned(
        &mut self,
        translator: &dyn MachineTranslator,
        samples: &[&str],
    ) -> MtResult<LanguagePair> {
        if let Some(pair) = &self.pair {
            return Ok(pair.clone());
        }

        let sample = samples
            .iter()
            .find(|sample| !sample.trim().is_empty())
            .ok_or_else(|| {
                MtError::TranslationError(
                    "No text available to detect the source language".to_string(),
                )
            })?;

        self.detections += 1;
        let probe = translator
            .translate(sample, None, &self.rule.probe_target)
            .await?;
        let detected = probe.detected_source_language.ok_or_else(|| {
            MtError::TranslationError(format!(
                "{} did not report a detected source language",
                translator.provider_name()
            ))
        })?;

        let pair = self.rule.pair_for(&detected);
        debug!(
            detected = %detected,
            source = %pair.source,
            target = %pair.target,
            "Pinned language pair"
        );
        self.pair = Some(pair.clone());
        Ok(pair)
    }
}
