//! Observable outcome of a run

use crate::block::BlockType;
use std::fmt;

/// Why a source block is absent from the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The API could not describe the block
    Unsupported,
    /// A column list one level down cannot carry its columns
    NestedColumnList,
    /// External file whose URL is blank
    BlankExternalUrl,
    /// Referenced child page could not be retrieved
    UnresolvedPage(String),
    /// Referenced child database could not be retrieved
    UnresolvedDatabase(String),
    /// Still has children below the nesting ceiling
    DepthCeiling,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Unsupported => write!(f, "unsupported block type"),
            DropReason::NestedColumnList => write!(f, "column list inside nested children"),
            DropReason::BlankExternalUrl => write!(f, "external file without URL"),
            DropReason::UnresolvedPage(err) => write!(f, "failed to load a page: {}", err),
            DropReason::UnresolvedDatabase(err) => write!(f, "failed to load a database: {}", err),
            DropReason::DepthCeiling => write!(f, "nested deeper than the API accepts"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedBlock {
    pub block_id: Option<String>,
    pub kind: BlockType,
    pub depth: usize,
    pub reason: DropReason,
}

/// What the walk did, beyond the blocks it returned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub pages_fetched: usize,
    /// Blocks replaced by a localized notice
    pub notices: usize,
    /// Child pages and databases turned into links
    pub links: usize,
    pub dropped: Vec<DroppedBlock>,
}

impl WalkReport {
    pub fn dropped_for(&self, reason: &DropReason) -> usize {
        self.dropped.iter().filter(|drop| &drop.reason == reason).count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitReport {
    pub batches: usize,
    pub blocks: usize,
}
