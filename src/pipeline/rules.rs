//! Per-type rewrite rules
//!
//! Every block read from the source passes through [`TreeWalker::rewrite_block`],
//! which applies the rules below in order. The first rule that decides the
//! block's fate short-circuits the rest.
//!
//! 1. `unsupported` blocks are dropped.
//! 2. From the flatten depth on, blocks report no children.
//! 3. A `column_list` one level above the flatten depth or deeper is
//!    dropped: its columns could not carry their content.
//! 4. Internally hosted files become a "removed" notice; external files are
//!    kept unless their URL is blank.
//! 5. Tables become a notice or a row-preserving stub, per [`TableMode`].
//! 6. Internally hosted images become a "removed" notice.
//! 7. and 8. Child pages and databases become `link_to_page` blocks.
//! 9. Anything that still has children gets them translated recursively,
//!    unless it sits at or below the depth ceiling.
//! 10. The result is sanitized and its `rich_text` and `caption` runs are
//!     translated (code stays as written).

use crate::block::{Block, BlockType, RichText};
use crate::error::PipelineResult;
use crate::mt::{localized_notice, translate_runs};
use crate::pipeline::policy::TableMode;
use crate::pipeline::report::{DropReason, DroppedBlock};
use crate::pipeline::walker::{RunState, TreeWalker};
use crate::sanitize::Sanitize;
use serde_json::{Map, Value, json};
use tracing::warn;

pub const FILE_REMOVED_NOTICE: &str = "(The file was removed from this page)";
pub const IMAGE_REMOVED_NOTICE: &str = "(The image was removed from this page)";
pub const TABLE_REMOVED_NOTICE: &str = "(The table was removed from this page)";

/// Payload keys whose runs are translated
const TEXT_KEYS: [&str; 2] = ["rich_text", "caption"];

/// Payload keys a table keeps when its rows are preserved
const TABLE_KEYS: [&str; 3] = ["table_width", "has_column_header", "has_row_header"];

#[derive(Debug)]
pub enum RuleOutcome {
    /// Source text still has to be translated
    Keep(Block),
    /// Text is already in the target language
    Localized(Block),
    Drop(DropReason),
}

impl TreeWalker<'_> {
    /// The translated copy of `block`, or `None` when it is dropped
    pub(crate) async fn rewrite_block(
        &self,
        block: Block,
        depth: usize,
        run: &mut RunState,
    ) -> PipelineResult<Option<Block>> {
        let block_id = block.id.clone();
        let kind = block.kind.clone();

        let mut block = match self.apply_rules(block, depth, run).await? {
            RuleOutcome::Drop(reason) => {
                run.report.dropped.push(DroppedBlock {
                    block_id,
                    kind,
                    depth,
                    reason,
                });
                return Ok(None);
            }
            RuleOutcome::Localized(mut block) => {
                block.sanitize();
                return Ok(Some(block));
            }
            RuleOutcome::Keep(block) => block,
        };

        block.sanitize();
        self.translate_payload(&mut block, run).await?;
        Ok(Some(block))
    }

    async fn apply_rules(
        &self,
        mut block: Block,
        depth: usize,
        run: &mut RunState,
    ) -> PipelineResult<RuleOutcome> {
        let policy = self.policy;

        if block.kind == BlockType::Unsupported {
            return Ok(RuleOutcome::Drop(DropReason::Unsupported));
        }

        if depth >= policy.flatten_depth {
            block.has_children = false;
        }

        if depth + 1 >= policy.flatten_depth && block.kind == BlockType::ColumnList {
            block.children_mut().clear();
            return Ok(RuleOutcome::Drop(DropReason::NestedColumnList));
        }

        let kind = block.kind.clone();
        match kind {
            BlockType::File if block.is_externally_hosted() => {
                if block.external_url().is_none_or(|url| url.trim().is_empty()) {
                    return Ok(RuleOutcome::Drop(DropReason::BlankExternalUrl));
                }
            }
            BlockType::File => {
                return self.notice(FILE_REMOVED_NOTICE, run).await;
            }
            BlockType::Table => match policy.table_mode {
                TableMode::Notice => return self.notice(TABLE_REMOVED_NOTICE, run).await,
                // Rows need a nesting level of their own
                TableMode::Preserve if depth >= policy.flatten_depth => {
                    return self.notice(TABLE_REMOVED_NOTICE, run).await;
                }
                TableMode::Preserve => block = table_stub(block),
            },
            BlockType::TableRow => {
                return Ok(RuleOutcome::Localized(self.translate_row(block, run).await?));
            }
            BlockType::Image if !block.is_externally_hosted() => {
                return self.notice(IMAGE_REMOVED_NOTICE, run).await;
            }
            BlockType::ChildPage => {
                let Some(id) = block.id.clone() else {
                    return Ok(RuleOutcome::Drop(DropReason::UnresolvedPage(
                        "block has no id".to_string(),
                    )));
                };
                return Ok(match self.store.retrieve_page(&id).await {
                    Ok(page) => {
                        run.report.links += 1;
                        RuleOutcome::Keep(link_to(block, "page_id", page.id.unwrap_or(id)))
                    }
                    Err(err) => {
                        warn!("Failed to load a page (error: {}) - Skipped this block.", err);
                        RuleOutcome::Drop(DropReason::UnresolvedPage(err.to_string()))
                    }
                });
            }
            BlockType::ChildDatabase => {
                let Some(id) = block.id.clone() else {
                    return Ok(RuleOutcome::Drop(DropReason::UnresolvedDatabase(
                        "block has no id".to_string(),
                    )));
                };
                return Ok(match self.store.retrieve_database(&id).await {
                    Ok(database) => {
                        run.report.links += 1;
                        RuleOutcome::Keep(link_to(block, "database_id", database.id))
                    }
                    Err(err) => {
                        warn!(
                            "Failed to load a database (error: {}) - Skipped this block.",
                            err
                        );
                        RuleOutcome::Drop(DropReason::UnresolvedDatabase(err.to_string()))
                    }
                });
            }
            _ => {}
        }

        if block.has_children {
            if depth >= policy.max_depth {
                return Ok(RuleOutcome::Drop(DropReason::DepthCeiling));
            }
            if let Some(id) = block.id.clone() {
                let children = self
                    .collect_translated_children(&id, depth + 1, run)
                    .await?;
                *block.children_mut() = children;
            }
        }

        Ok(RuleOutcome::Keep(block))
    }

    async fn notice(&self, message: &str, run: &mut RunState) -> PipelineResult<RuleOutcome> {
        let runs = localized_notice(message, &mut run.language, self.translator).await?;
        run.report.notices += 1;
        Ok(RuleOutcome::Localized(Block::paragraph(runs)))
    }

    /// A bare row holding the translated cells
    async fn translate_row(&self, block: Block, run: &mut RunState) -> PipelineResult<Block> {
        let cells = block.payload.get("cells").cloned().unwrap_or(json!([]));
        let mut cells: Vec<Vec<RichText>> = serde_json::from_value(cells)?;
        for cell in cells.iter_mut() {
            translate_runs(cell, &mut run.language, self.translator).await?;
        }

        let mut payload = Map::new();
        payload.insert("cells".to_string(), serde_json::to_value(&cells)?);
        let mut row = Block::new(BlockType::TableRow, payload);
        row.extra.insert("archived".to_string(), Value::Bool(false));
        Ok(row)
    }

    async fn translate_payload(&self, block: &mut Block, run: &mut RunState) -> PipelineResult<()> {
        for key in TEXT_KEYS {
            if key == "rich_text" && block.kind == BlockType::Code {
                continue;
            }
            let Some(value) = block.payload.get_mut(key) else {
                continue;
            };
            let mut runs: Vec<RichText> = serde_json::from_value(value.take())?;
            translate_runs(&mut runs, &mut run.language, self.translator).await?;
            *value = serde_json::to_value(&runs)?;
        }
        Ok(())
    }
}

/// Table with only its shape, set up to have its rows fetched
fn table_stub(block: Block) -> Block {
    let payload = block
        .payload
        .into_iter()
        .filter(|(key, _)| TABLE_KEYS.contains(&key.as_str()))
        .collect();
    let mut stub = Block::new(BlockType::Table, payload);
    stub.id = block.id;
    stub.has_children = true;
    stub
}

fn link_to(mut block: Block, target_key: &str, target_id: String) -> Block {
    let mut payload = Map::new();
    payload.insert("type".to_string(), json!(target_key));
    payload.insert(target_key.to_string(), json!(target_id));
    block.kind = BlockType::LinkToPage;
    block.payload = payload;
    block.has_children = false;
    block.children_mut().clear();
    block
}
