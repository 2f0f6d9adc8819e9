//! In-memory content store
//!
//! Holds a fixed tree of pages, databases and children, paginates listings
//! like the API does, and records every write so tests can inspect what the
//! pipeline submitted.

use crate::block::{Block, ChildrenPage, Database, Page, PageDraft};
use crate::notion::ContentStore;
use crate::notion::error::{StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

/// One `list_children` request as received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCall {
    pub block_id: String,
    pub cursor: Option<String>,
    pub page_size: usize,
}

#[derive(Debug, Default)]
struct MemoryState {
    pages: HashMap<String, Page>,
    databases: HashMap<String, Database>,
    children: HashMap<String, Vec<Block>>,
    created: Vec<PageDraft>,
    appended: Vec<(String, Vec<Block>)>,
    list_calls: Vec<ListCall>,
    /// Zero-based append call that fails
    failing_append: Option<usize>,
    append_attempts: usize,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page titled `title` with the usual read-only fields filled in
    pub fn with_page(self, id: &str, title: &str) -> Self {
        let page = Page::try_from(json!({
            "object": "page",
            "id": id,
            "url": format!("https://www.notion.so/{}", id.replace('-', "")),
            "created_time": "2023-01-01T00:00:00.000Z",
            "last_edited_time": "2023-01-01T00:00:00.000Z",
            "created_by": {"object": "user", "id": "author"},
            "last_edited_by": {"object": "user", "id": "author"},
            "parent": {"type": "workspace", "workspace": true},
            "archived": false,
            "properties": {
                "title": {
                    "id": "title",
                    "type": "title",
                    "title": [{
                        "type": "text",
                        "text": {"content": title, "link": null},
                        "plain_text": title,
                        "href": null
                    }]
                }
            }
        }));
        match page {
            Ok(page) => self.with_raw_page(page),
            Err(_) => self,
        }
    }

    pub fn with_raw_page(self, page: Page) -> Self {
        if let Ok(mut state) = self.state.lock() {
            let id = page.id.clone().unwrap_or_default();
            state.pages.insert(id, page);
        }
        self
    }

    pub fn with_database(self, id: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.databases.insert(
                id.to_string(),
                Database {
                    id: id.to_string(),
                    extra: Map::new(),
                },
            );
        }
        self
    }

    /// Children of `parent_id`, given in API JSON shape
    pub fn with_children(self, parent_id: &str, children: Vec<Value>) -> Self {
        let blocks = children
            .into_iter()
            .filter_map(|child| Block::try_from(child).ok())
            .collect();
        if let Ok(mut state) = self.state.lock() {
            state.children.insert(parent_id.to_string(), blocks);
        }
        self
    }

    /// Make the `call`-th (zero-based) append request fail
    pub fn failing_append(self, call: usize) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.failing_append = Some(call);
        }
        self
    }

    pub fn created_pages(&self) -> Vec<PageDraft> {
        self.read(|state| state.created.clone())
    }

    /// Successful append requests, in order
    pub fn appended(&self) -> Vec<(String, Vec<Block>)> {
        self.read(|state| state.appended.clone())
    }

    pub fn list_calls(&self) -> Vec<ListCall> {
        self.read(|state| state.list_calls.clone())
    }

    fn read<T: Default>(&self, f: impl FnOnce(&MemoryState) -> T) -> T {
        self.state.lock().map(|state| f(&state)).unwrap_or_default()
    }

    fn write<T>(&self, f: impl FnOnce(&mut MemoryState) -> StoreResult<T>) -> StoreResult<T> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StoreError::InvalidResponse("memory store lock poisoned".to_string()))?;
        f(&mut state)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn retrieve_page(&self, page_id: &str) -> StoreResult<Page> {
        self.write(|state| {
            state
                .pages
                .get(page_id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("Could not find page with ID: {}.", page_id)))
        })
    }

    async fn retrieve_database(&self, database_id: &str) -> StoreResult<Database> {
        self.write(|state| {
            state.databases.get(database_id).cloned().ok_or_else(|| {
                StoreError::NotFound(format!("Could not find database with ID: {}.", database_id))
            })
        })
    }

    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
        page_size: usize,
    ) -> StoreResult<ChildrenPage> {
        self.write(|state| {
            state.list_calls.push(ListCall {
                block_id: block_id.to_string(),
                cursor: cursor.map(str::to_string),
                page_size,
            });

            let start = match cursor {
                Some(cursor) => cursor.parse::<usize>().map_err(|_| {
                    StoreError::Api {
                        status: 400,
                        code: "validation_error".to_string(),
                        message: format!("Invalid start_cursor: {}", cursor),
                    }
                })?,
                None => 0,
            };
            let children = state.children.get(block_id).map(Vec::as_slice).unwrap_or_default();
            let end = (start + page_size.max(1)).min(children.len());
            let results = children.get(start..end).unwrap_or_default().to_vec();
            let has_more = end < children.len();

            Ok(ChildrenPage {
                results,
                has_more,
                next_cursor: has_more.then(|| end.to_string()),
            })
        })
    }

    async fn create_page(&self, draft: &PageDraft) -> StoreResult<Page> {
        self.write(|state| {
            state.created.push(draft.clone());
            let id = format!("created-{}", state.created.len());

            let mut page = Value::Object(draft.extra.clone());
            page["id"] = json!(id);
            page["url"] = json!(format!("https://www.notion.so/{}", id));
            page["parent"] = draft.parent.clone();
            page["properties"] = Value::Object(draft.properties.clone());
            Page::try_from(page).map_err(|e| StoreError::InvalidResponse(e.to_string()))
        })
    }

    async fn append_children(&self, block_id: &str, children: &[Block]) -> StoreResult<()> {
        self.write(|state| {
            let attempt = state.append_attempts;
            state.append_attempts += 1;
            if state.failing_append == Some(attempt) {
                return Err(StoreError::Api {
                    status: 500,
                    code: "internal_server_error".to_string(),
                    message: "Unexpected error".to_string(),
                });
            }
            state
                .appended
                .push((block_id.to_string(), children.to_vec()));
            Ok(())
        })
    }

    fn store_name(&self) -> &str {
        "Memory"
    }
}
