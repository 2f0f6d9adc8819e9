//! Page translation pipeline
//!
//! [`PageTranslator`] reads a page through a [`ContentStore`], walks its block
//! tree with [`TreeWalker`], drafts the translated child page with
//! [`draft_translation_target`] and appends the result with [`submit`].
//!
//! # Example
//!
//! ```ignore
//! use notion_translator::mt::{DeeplTranslator, LanguagePair};
//! use notion_translator::notion::NotionClient;
//! use notion_translator::pipeline::{LanguageMode, PageTranslator, TranslationPolicy};
//! use std::sync::Arc;
//!
//! let translator = PageTranslator::new(
//!     Arc::new(NotionClient::from_env()?),
//!     Arc::new(DeeplTranslator::from_env()?),
//!     TranslationPolicy::default(),
//! );
//! let outcome = translator
//!     .translate_page("https://www.notion.so/Notes-0123456789abcdef0123456789abcdef",
//!         LanguageMode::Fixed(LanguagePair::new("EN", "JA")))
//!     .await?;
//! println!("{}", outcome.url.unwrap_or_default());
//! ```

pub mod cloner;
pub mod policy;
pub mod progress;
pub mod report;
pub mod rules;
pub mod submitter;
pub mod walker;

#[cfg(test)]
mod integration_tests;

use crate::block::Page;
use crate::error::{PipelineError, PipelineResult};
use crate::mt::{LanguageContext, LanguagePair, MachineTranslator};
use crate::notion::{ContentStore, StoreError, extract_page_id};
use std::sync::Arc;
use tracing::{debug, info};

pub use cloner::{FALLBACK_TITLE, draft_translation_target, title_text};
pub use policy::{MissingTitlePolicy, TableMode, TranslationPolicy};
pub use progress::{DotProgress, LogProgress, ProgressReporter, SilentProgress};
pub use report::{DropReason, DroppedBlock, SubmitReport, WalkReport};
pub use rules::RuleOutcome;
pub use submitter::submit;
pub use walker::{RunState, TreeWalker};

/// How a run obtains its language pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageMode {
    /// Detected from the page's first text, then pinned
    Detect,
    Fixed(LanguagePair),
}

impl LanguageMode {
    fn into_context(self) -> LanguageContext {
        match self {
            LanguageMode::Detect => LanguageContext::auto(),
            LanguageMode::Fixed(pair) => LanguageContext::fixed(pair),
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub page_id: String,
    pub url: Option<String>,
    pub pair: LanguagePair,
    pub walk: WalkReport,
    pub submit: SubmitReport,
}

/// Translates pages from one store into new child pages in the same store
#[derive(Clone)]
pub struct PageTranslator {
    store: Arc<dyn ContentStore>,
    translator: Arc<dyn MachineTranslator>,
    policy: TranslationPolicy,
    progress: Arc<dyn ProgressReporter>,
}

impl PageTranslator {
    pub fn new(
        store: Arc<dyn ContentStore>,
        translator: Arc<dyn MachineTranslator>,
        policy: TranslationPolicy,
    ) -> Self {
        Self {
            store,
            translator,
            policy,
            progress: Arc::new(SilentProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn policy(&self) -> &TranslationPolicy {
        &self.policy
    }

    /// Translate the page `page_ref` (id, dashed UUID or URL) into a new child page
    pub async fn translate_page(
        &self,
        page_ref: &str,
        languages: LanguageMode,
    ) -> PipelineResult<TranslationOutcome> {
        let page_id = extract_page_id(page_ref)
            .ok_or_else(|| PipelineError::InvalidPageRef(page_ref.to_string()))?;
        let original = self.load_source_page(&page_id).await?;
        let source_id = original.id.clone().unwrap_or_else(|| page_id.clone());
        let title = title_text(&original);
        info!("Translating page {} ({})", source_id, title);

        let mut run = RunState::new(languages.into_context().with_hint(title.clone()));
        let walker = TreeWalker::new(
            self.store.as_ref(),
            self.translator.as_ref(),
            &self.policy,
            self.progress.as_ref(),
        );
        let blocks = walker
            .collect_translated_children(&source_id, 0, &mut run)
            .await?;

        // A page without any text still needs a pair for its title
        let pair = run
            .language
            .ensure_pinned(self.translator.as_ref(), &[title.as_str(), FALLBACK_TITLE])
            .await?;
        debug!(
            "Walked {} page(s) of children: {} block(s), {} dropped",
            run.report.pages_fetched,
            blocks.len(),
            run.report.dropped.len()
        );

        let draft = draft_translation_target(&original, &pair, &self.policy.missing_title)?;
        let created = self.store.create_page(&draft).await?;
        let new_id = created.id.clone().ok_or_else(|| {
            StoreError::InvalidResponse("created page has no id".to_string())
        })?;
        info!("Created page {}", new_id);

        let submitted = submit(
            self.store.as_ref(),
            &new_id,
            &blocks,
            self.policy.max_batch_size,
        )
        .await?;

        Ok(TranslationOutcome {
            page_id: new_id,
            url: created.url,
            pair,
            walk: run.report,
            submit: submitted,
        })
    }

    /// The page, or why it cannot be translated
    async fn load_source_page(&self, page_id: &str) -> PipelineResult<Page> {
        match self.store.retrieve_page(page_id).await {
            Ok(page) => Ok(page),
            Err(source) => {
                if self.store.retrieve_database(page_id).await.is_ok() {
                    Err(PipelineError::NotAPage(page_id.to_string()))
                } else {
                    Err(PipelineError::Unreadable {
                        id: page_id.to_string(),
                        source,
                    })
                }
            }
        }
    }
}

impl std::fmt::Debug for PageTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageTranslator")
            .field("store", &self.store.store_name())
            .field("translator", &self.translator.provider_name())
            .field("policy", &self.policy)
            .finish()
    }
}
