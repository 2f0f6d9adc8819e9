//! Appending the translated blocks to the new page

use crate::block::Block;
use crate::error::{PipelineError, PipelineResult};
use crate::notion::ContentStore;
use crate::pipeline::report::SubmitReport;
use tracing::debug;

/// Append `blocks` to `page_id` in consecutive chunks of at most `max_batch`
///
/// `None` sends everything in one request. The first failing request aborts
/// the rest; batches accepted before it stay on the page.
pub async fn submit(
    store: &dyn ContentStore,
    page_id: &str,
    blocks: &[Block],
    max_batch: Option<usize>,
) -> PipelineResult<SubmitReport> {
    let mut report = SubmitReport::default();
    if blocks.is_empty() {
        return Ok(report);
    }

    let size = max_batch.unwrap_or(blocks.len()).max(1);
    for chunk in blocks.chunks(size) {
        store
            .append_children(page_id, chunk)
            .await
            .map_err(|source| PipelineError::Submission {
                accepted: report.batches,
                source,
            })?;
        report.batches += 1;
        report.blocks += chunk.len();
        debug!(
            "Appended batch {} ({} block(s), {} of {})",
            report.batches,
            chunk.len(),
            report.blocks,
            blocks.len()
        );
    }

    Ok(report)
}
