//! Limits and per-type choices of the destination API, gathered in one place

use crate::notion::MAX_PAGE_SIZE;

/// What happens to `table` blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableMode {
    /// Replace the table with a localized "removed" notice
    Notice,
    /// Keep the table shape and translate every cell of its rows
    #[default]
    Preserve,
}

impl std::str::FromStr for TableMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "notice" => Ok(TableMode::Notice),
            "preserve" => Ok(TableMode::Preserve),
            other => Err(format!("unknown table mode '{}' (expected notice or preserve)", other)),
        }
    }
}

/// What happens when the source page has no title to suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingTitlePolicy {
    Fail,
    /// Title the copy with this text (plus the language suffix)
    Fallback(String),
}

impl Default for MissingTitlePolicy {
    fn default() -> Self {
        MissingTitlePolicy::Fallback(super::cloner::FALLBACK_TITLE.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationPolicy {
    /// Children requested per listing call
    pub page_size: usize,
    /// Blocks per append call; `None` submits everything in one call
    pub max_batch_size: Option<usize>,
    /// Depth from which blocks are forced to report no children
    pub flatten_depth: usize,
    /// Depth from which blocks that still have children are dropped
    pub max_depth: usize,
    pub table_mode: TableMode,
    pub missing_title: MissingTitlePolicy,
}

impl Default for TranslationPolicy {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_batch_size: Some(10),
            // The append endpoint accepts two levels of nesting per request
            flatten_depth: 2,
            max_depth: 3,
            table_mode: TableMode::default(),
            missing_title: MissingTitlePolicy::default(),
        }
    }
}

impl TranslationPolicy {
    pub fn with_batch_size(mut self, max_batch_size: Option<usize>) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    pub fn with_table_mode(mut self, table_mode: TableMode) -> Self {
        self.table_mode = table_mode;
        self
    }

    pub fn with_missing_title(mut self, missing_title: MissingTitlePolicy) -> Self {
        self.missing_title = missing_title;
        self
    }
}
