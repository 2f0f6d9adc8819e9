//! Translation of rich text runs
//!
//! Runs are rewritten in place: `plain_text` receives the translation and
//! `text.content`, when present, is kept equal to it.

use crate::block::RichText;
use crate::mt::error::{MtError, MtResult};
use crate::mt::language::{LanguageContext, LanguagePair};
use crate::mt::translator::{MachineTranslator, normalize_locale};

/// Language the fixed notices are written in
pub const NOTICE_LANGUAGE: &str = "EN";

/// Translate every non-empty run with the run's language pair
///
/// Pins the pair from the first non-blank run (or the context's hint) when
/// the context is still undetermined. Returns the pinned pair, or `None`
/// when nothing could be translated and no pair had been pinned yet.
pub async fn translate_runs(
    runs: &mut [RichText],
    ctx: &mut LanguageContext,
    translator: &dyn MachineTranslator,
) -> MtResult<Option<LanguagePair>> {
    let indices: Vec<usize> = runs
        .iter()
        .enumerate()
        .filter(|(_, run)| !run.plain_text.is_empty())
        .map(|(index, _)| index)
        .collect();
    if indices.is_empty() {
        return Ok(ctx.pair().cloned());
    }

    let texts: Vec<String> = indices
        .iter()
        .map(|&index| runs[index].plain_text.clone())
        .collect();

    let hint = ctx.hint().map(str::to_string);
    let mut samples: Vec<&str> = texts.iter().map(String::as_str).collect();
    samples.extend(hint.as_deref());
    if !ctx.is_pinned() && samples.iter().all(|sample| sample.trim().is_empty()) {
        // Whitespace alone cannot reveal a language
        return Ok(None);
    }

    let pair = ctx.ensure_pinned(translator, &samples).await?;

    let translations = translator
        .translate_batch(&texts, Some(&pair.source), &pair.target)
        .await?;

    if translations.len() != texts.len() {
        return Err(MtError::TranslationError(format!(
            "{} returned {} translations for {} texts",
            translator.provider_name(),
            translations.len(),
            texts.len()
        )));
    }

    for (index, translation) in indices.into_iter().zip(translations) {
        runs[index].set_text(translation.text);
    }

    Ok(Some(pair))
}

/// A one-run notice localized into the run's target language
///
/// Notices are English; they are left as written when the target is English.
pub async fn localized_notice(
    message: &str,
    ctx: &mut LanguageContext,
    translator: &dyn MachineTranslator,
) -> MtResult<Vec<RichText>> {
    let hint = ctx.hint().unwrap_or_default().to_string();
    let pair = ctx.ensure_pinned(translator, &[&hint, message]).await?;

    if normalize_locale(&pair.target) == normalize_locale(NOTICE_LANGUAGE) {
        return Ok(vec![RichText::plain(message)]);
    }

    let translation = translator
        .translate(message, Some(NOTICE_LANGUAGE), &pair.target)
        .await?;
    Ok(vec![RichText::plain(&translation.text)])
}
