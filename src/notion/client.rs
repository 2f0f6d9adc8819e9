//! Notion REST API client
//!
//! # Authentication
//!
//! The client loads an internal integration token from the `NOTION_API_TOKEN`
//! environment variable. The integration needs the "Read content" and
//! "Insert content" capabilities, and the page has to be shared with it.

use crate::block::{Block, ChildrenPage, Database, Page, PageDraft};
use crate::notion::ContentStore;
use crate::notion::error::{StoreError, StoreResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

/// Environment variable holding the integration token
pub const NOTION_TOKEN_VAR: &str = "NOTION_API_TOKEN";

/// API version the block and page shapes in this crate follow
pub const NOTION_VERSION: &str = "2022-06-28";

const BASE_URL: &str = "https://api.notion.com/v1";

#[derive(Clone)]
pub struct NotionClient {
    token: String,
    client: reqwest::Client,
    base_url: String,
}

impl NotionClient {
    pub fn new(token: String) -> StoreResult<Self> {
        if token.trim().is_empty() {
            return Err(StoreError::ConfigError("API token cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            token,
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Create a client from the `NOTION_API_TOKEN` environment variable
    pub fn from_env() -> StoreResult<Self> {
        let token = std::env::var(NOTION_TOKEN_VAR).map_err(|_| {
            StoreError::ConfigError(format!("{} environment variable not set", NOTION_TOKEN_VAR))
        })?;

        Self::new(token)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> StoreResult<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(error_from_response(status, &body));
        }

        let body: Value = response.json().await?;
        debug!("{} response: {}", self.store_name(), body);
        serde_json::from_value(body).map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }
}

/// Map an error answer (`{"object": "error", "code": ..., "message": ...}`) to a [`StoreError`]
fn error_from_response(status: StatusCode, body: &Value) -> StoreError {
    let code = body["code"].as_str().unwrap_or("unknown").to_string();
    let message = body["message"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string());

    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Forbidden(message),
        _ => StoreError::Api {
            status: status.as_u16(),
            code,
            message,
        },
    }
}

impl std::fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionClient")
            .field("token", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl ContentStore for NotionClient {
    async fn retrieve_page(&self, page_id: &str) -> StoreResult<Page> {
        self.send(self.request(reqwest::Method::GET, &format!("pages/{}", page_id)))
            .await
    }

    async fn retrieve_database(&self, database_id: &str) -> StoreResult<Database> {
        self.send(self.request(
            reqwest::Method::GET,
            &format!("databases/{}", database_id),
        ))
        .await
    }

    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
        page_size: usize,
    ) -> StoreResult<ChildrenPage> {
        // Cursors are block ids, safe to place in a query string as-is
        let mut path = format!("blocks/{}/children?page_size={}", block_id, page_size);
        if let Some(cursor) = cursor {
            path.push_str(&format!("&start_cursor={}", cursor));
        }

        self.send(self.request(reqwest::Method::GET, &path)).await
    }

    async fn create_page(&self, draft: &PageDraft) -> StoreResult<Page> {
        debug!(
            "New page creation request params: {}",
            serde_json::to_string_pretty(draft).unwrap_or_default()
        );
        self.send(self.request(reqwest::Method::POST, "pages").json(draft))
            .await
    }

    async fn append_children(&self, block_id: &str, children: &[Block]) -> StoreResult<()> {
        let body = json!({ "children": children });
        debug!("Block creation request params: {}", body);
        let _: Value = self
            .send(
                self.request(
                    reqwest::Method::PATCH,
                    &format!("blocks/{}/children", block_id),
                )
                .json(&body),
            )
            .await?;
        Ok(())
    }

    fn store_name(&self) -> &str {
        "Notion"
    }
}
