//! Notion page translation
//!
//! This crate copies a Notion page into a new child page with every visible
//! text run machine-translated, keeping the block structure the API allows.
//!
//! # Workflow Example
//!
//! ```ignore
//! use notion_translator::{
//!     DeeplTranslator, LanguageMode, NotionClient, PageTranslator, TranslationPolicy,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Connect both services
//!     let store = NotionClient::from_env()?;
//!     let provider = DeeplTranslator::from_env()?;
//!
//!     // 2. Translate, letting the page's first text decide the languages
//!     let translator =
//!         PageTranslator::new(Arc::new(store), Arc::new(provider), TranslationPolicy::default());
//!     let outcome = translator
//!         .translate_page("0123456789abcdef0123456789abcdef", LanguageMode::Detect)
//!         .await?;
//!
//!     // 3. The new page sits under the original one
//!     println!("Result: {}", outcome.url.unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod block;
pub mod config;
pub mod error;
pub mod mt;
pub mod notion;
pub mod pipeline;
pub mod sanitize;

// Re-export main types for convenient access
pub use block::{Block, BlockType, ChildrenPage, Database, Page, PageDraft, RichText};
pub use config::{ConfigError, Credentials};
pub use error::{PipelineError, PipelineResult};
pub use mt::{
    DeeplTranslator, LanguageContext, LanguagePair, MachineTranslator, MockMode, MockTranslator,
    MtError, MtResult,
};
pub use notion::{ContentStore, MemoryStore, NotionClient, StoreError, StoreResult};
pub use pipeline::{
    LanguageMode, PageTranslator, TableMode, TranslationOutcome, TranslationPolicy,
};
pub use sanitize::Sanitize;
