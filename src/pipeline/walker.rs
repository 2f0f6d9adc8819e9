//! Depth-first, paginated walk over a block's children

use crate::block::Block;
use crate::error::{PipelineError, PipelineResult};
use crate::mt::{LanguageContext, MachineTranslator};
use crate::notion::ContentStore;
use crate::pipeline::policy::TranslationPolicy;
use crate::pipeline::progress::ProgressReporter;
use crate::pipeline::report::WalkReport;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

type WalkFuture<'s> = Pin<Box<dyn Future<Output = PipelineResult<Vec<Block>>> + Send + 's>>;

/// Mutable state shared by every level of one walk
#[derive(Debug)]
pub struct RunState {
    pub language: LanguageContext,
    pub report: WalkReport,
}

impl RunState {
    pub fn new(language: LanguageContext) -> Self {
        Self {
            language,
            report: WalkReport::default(),
        }
    }
}

/// Reads a block tree and returns its translated copy
pub struct TreeWalker<'a> {
    pub(crate) store: &'a dyn ContentStore,
    pub(crate) translator: &'a dyn MachineTranslator,
    pub(crate) policy: &'a TranslationPolicy,
    pub(crate) progress: &'a dyn ProgressReporter,
}

impl<'a> TreeWalker<'a> {
    pub fn new(
        store: &'a dyn ContentStore,
        translator: &'a dyn MachineTranslator,
        policy: &'a TranslationPolicy,
        progress: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            store,
            translator,
            policy,
            progress,
        }
    }

    /// Translated children of `parent_id`, in source order
    ///
    /// `depth` is the depth of the children themselves: 0 for the direct
    /// children of a page.
    pub fn collect_translated_children<'s>(
        &'s self,
        parent_id: &'s str,
        depth: usize,
        run: &'s mut RunState,
    ) -> WalkFuture<'s> {
        Box::pin(async move {
            let mut translated = Vec::new();
            let mut cursor: Option<String> = None;

            loop {
                let listing = self
                    .store
                    .list_children(parent_id, cursor.as_deref(), self.policy.page_size)
                    .await
                    .map_err(PipelineError::Store)?;

                debug!(
                    "{} children of {} (depth {}): {} block(s), has_more: {}",
                    self.store.store_name(),
                    parent_id,
                    depth,
                    listing.results.len(),
                    listing.has_more
                );
                run.report.pages_fetched += 1;
                self.progress
                    .page_fetched(parent_id, depth, listing.results.len());

                for block in listing.results {
                    if let Some(block) = self.rewrite_block(block, depth, run).await? {
                        translated.push(block);
                    }
                }

                match listing.next_cursor {
                    Some(next) if listing.has_more => cursor = Some(next),
                    _ => break,
                }
            }

            Ok(translated)
        })
    }
}
