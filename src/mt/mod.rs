/// Machine Translation Module
///
/// This module provides the translation side of the page pipeline: a generic
/// provider trait with DeepL and mock implementations, the per-run language
/// pair, and the in-place rewriting of rich text runs.
///
/// # Example
///
/// ```ignore
/// use notion_translator::mt::{DeeplTranslator, LanguageContext, translate_runs};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = DeeplTranslator::from_env()?;
///     let mut ctx = LanguageContext::auto();
///     let mut runs = vec![notion_translator::RichText::plain("Hello")];
///
///     let pair = translate_runs(&mut runs, &mut ctx, &provider).await?;
///     println!("{:?} {}", pair, runs[0].plain_text);
///     Ok(())
/// }
/// ```
pub mod deepl;
pub mod error;
pub mod language;
pub mod mock;
pub mod rich_text;
pub mod translator;

pub use deepl::DeeplTranslator;
pub use error::{MtError, MtResult};
pub use language::{
    DetectionRule, LanguageContext, LanguagePair, validate_source_language,
    validate_target_language,
};
pub use mock::{MockCall, MockMode, MockTranslator};
pub use rich_text::{localized_notice, translate_runs};
pub use translator::{MachineTranslator, Translation};
