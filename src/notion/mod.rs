//! Access to the Notion workspace that is both read from and written to
//!
//! The pipeline only ever talks to [`ContentStore`]; `NotionClient` implements it
//! over the public REST API and `MemoryStore` in memory for tests.

pub mod client;
pub mod error;
pub mod id;
pub mod memory;

use crate::block::{Block, ChildrenPage, Database, Page, PageDraft};
use async_trait::async_trait;

pub use client::NotionClient;
pub use error::{StoreError, StoreResult};
pub use id::extract_page_id;
pub use memory::MemoryStore;

/// Largest page size the children listing accepts
pub const MAX_PAGE_SIZE: usize = 100;

/// Read and write operations the translation pipeline needs
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn retrieve_page(&self, page_id: &str) -> StoreResult<Page>;

    async fn retrieve_database(&self, database_id: &str) -> StoreResult<Database>;

    /// One page of the direct children of `block_id`
    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
        page_size: usize,
    ) -> StoreResult<ChildrenPage>;

    async fn create_page(&self, draft: &PageDraft) -> StoreResult<Page>;

    /// Append `children` after the existing children of `block_id`
    async fn append_children(&self, block_id: &str, children: &[Block]) -> StoreResult<()>;

    /// Used in log lines
    fn store_name(&self) -> &str;
}
