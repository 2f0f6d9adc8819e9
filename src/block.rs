//! Notion content model
//!
//! Blocks arrive from the API as JSON objects whose type-specific payload sits
//! under a key named after the block type (`{"type": "paragraph", "paragraph": {...}}`).
//! `Block` lifts the discriminant into [`BlockType`], keeps the payload as an open
//! JSON object so unknown fields survive the copy, and moves nested children out of
//! the payload into a typed list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

/// Keys the API assigns on read and rejects (or ignores) on create.
const AUDIT_KEYS: [&str; 4] = [
    "created_time",
    "last_edited_time",
    "created_by",
    "last_edited_by",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockType {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletedListItem,
    NumberedListItem,
    ToDo,
    Toggle,
    Quote,
    Callout,
    Code,
    Image,
    File,
    Video,
    Pdf,
    Bookmark,
    Table,
    TableRow,
    ColumnList,
    Column,
    ChildPage,
    ChildDatabase,
    LinkToPage,
    SyncedBlock,
    Unsupported,
    Other(String),
}

impl BlockType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "paragraph" => BlockType::Paragraph,
            "heading_1" => BlockType::Heading1,
            "heading_2" => BlockType::Heading2,
            "heading_3" => BlockType::Heading3,
            "bulleted_list_item" => BlockType::BulletedListItem,
            "numbered_list_item" => BlockType::NumberedListItem,
            "to_do" => BlockType::ToDo,
            "toggle" => BlockType::Toggle,
            "quote" => BlockType::Quote,
            "callout" => BlockType::Callout,
            "code" => BlockType::Code,
            "image" => BlockType::Image,
            "file" => BlockType::File,
            "video" => BlockType::Video,
            "pdf" => BlockType::Pdf,
            "bookmark" => BlockType::Bookmark,
            "table" => BlockType::Table,
            "table_row" => BlockType::TableRow,
            "column_list" => BlockType::ColumnList,
            "column" => BlockType::Column,
            "child_page" => BlockType::ChildPage,
            "child_database" => BlockType::ChildDatabase,
            "link_to_page" => BlockType::LinkToPage,
            "synced_block" => BlockType::SyncedBlock,
            "unsupported" => BlockType::Unsupported,
            other => BlockType::Other(other.to_string()),
        }
    }

    /// The tag used both as the `type` value and as the payload key
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading1 => "heading_1",
            BlockType::Heading2 => "heading_2",
            BlockType::Heading3 => "heading_3",
            BlockType::BulletedListItem => "bulleted_list_item",
            BlockType::NumberedListItem => "numbered_list_item",
            BlockType::ToDo => "to_do",
            BlockType::Toggle => "toggle",
            BlockType::Quote => "quote",
            BlockType::Callout => "callout",
            BlockType::Code => "code",
            BlockType::Image => "image",
            BlockType::File => "file",
            BlockType::Video => "video",
            BlockType::Pdf => "pdf",
            BlockType::Bookmark => "bookmark",
            BlockType::Table => "table",
            BlockType::TableRow => "table_row",
            BlockType::ColumnList => "column_list",
            BlockType::Column => "column",
            BlockType::ChildPage => "child_page",
            BlockType::ChildDatabase => "child_database",
            BlockType::LinkToPage => "link_to_page",
            BlockType::SyncedBlock => "synced_block",
            BlockType::Unsupported => "unsupported",
            BlockType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error raised when a JSON value does not have the shape of a block or page
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("payload of '{0}' block is not an object")]
    InvalidPayload(String),
}

/// Server-assigned creation and modification metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditFields {
    pub created_time: Option<Value>,
    pub last_edited_time: Option<Value>,
    pub created_by: Option<Value>,
    pub last_edited_by: Option<Value>,
}

impl AuditFields {
    fn take_from(map: &mut Map<String, Value>) -> Self {
        Self {
            created_time: map.remove(AUDIT_KEYS[0]),
            last_edited_time: map.remove(AUDIT_KEYS[1]),
            created_by: map.remove(AUDIT_KEYS[2]),
            last_edited_by: map.remove(AUDIT_KEYS[3]),
        }
    }

    fn write_into(self, map: &mut Map<String, Value>) {
        let fields = [
            self.created_time,
            self.last_edited_time,
            self.created_by,
            self.last_edited_by,
        ];
        for (key, value) in AUDIT_KEYS.iter().zip(fields) {
            if let Some(value) = value {
                map.insert(key.to_string(), value);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.created_time.is_none()
            && self.last_edited_time.is_none()
            && self.created_by.is_none()
            && self.last_edited_by.is_none()
    }
}

/// A single content block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Block {
    pub id: Option<String>,
    pub kind: BlockType,
    /// Type-specific object, serialized under the key `kind.as_str()`
    pub payload: Map<String, Value>,
    /// Nested blocks, serialized as `payload.children`
    pub children: Vec<Block>,
    pub has_children: bool,
    pub audit: AuditFields,
    /// Remaining top-level fields (`object`, `parent`, `archived`, ...)
    pub extra: Map<String, Value>,
}

impl Block {
    pub fn new(kind: BlockType, payload: Map<String, Value>) -> Self {
        Self {
            id: None,
            kind,
            payload,
            children: Vec::new(),
            has_children: false,
            audit: AuditFields::default(),
            extra: Map::new(),
        }
    }

    /// A default-colored paragraph holding the given runs
    pub fn paragraph(runs: Vec<RichText>) -> Self {
        let mut payload = Map::new();
        payload.insert("color".to_string(), json!("default"));
        payload.insert("rich_text".to_string(), json!(runs));
        Self::new(BlockType::Paragraph, payload)
    }

    /// Children attached under this block's own payload key
    pub fn children(&self) -> &[Block] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Block> {
        &mut self.children
    }

    /// Hosting discriminant of file-like payloads: `external`, `file`, `file_upload`
    pub fn hosting(&self) -> Option<&str> {
        self.payload.get("type").and_then(Value::as_str)
    }

    pub fn is_externally_hosted(&self) -> bool {
        self.hosting() == Some("external")
    }

    /// URL of an externally hosted file-like payload
    pub fn external_url(&self) -> Option<&str> {
        self.payload
            .get("external")
            .and_then(|external| external.get("url"))
            .or_else(|| self.payload.get("url"))
            .and_then(Value::as_str)
    }
}

impl TryFrom<Value> for Block {
    type Error = ModelError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut map) = value else {
            return Err(ModelError::NotAnObject);
        };

        let tag = match map.remove("type") {
            Some(Value::String(tag)) => tag,
            _ => return Err(ModelError::MissingField("type")),
        };

        let mut payload = match map.remove(&tag) {
            Some(Value::Object(payload)) => payload,
            Some(Value::Null) | None => Map::new(),
            Some(_) => return Err(ModelError::InvalidPayload(tag)),
        };

        let children = match payload.remove("children") {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(Block::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            _ => Vec::new(),
        };

        let id = map
            .remove("id")
            .and_then(|id| id.as_str().map(str::to_string));
        let has_children = map
            .remove("has_children")
            .and_then(|flag| flag.as_bool())
            .unwrap_or(false);
        let audit = AuditFields::take_from(&mut map);

        Ok(Block {
            id,
            kind: BlockType::from_tag(&tag),
            payload,
            children,
            has_children,
            audit,
            extra: map,
        })
    }
}

impl From<Block> for Value {
    fn from(block: Block) -> Self {
        let mut map = block.extra;
        if let Some(id) = block.id {
            map.insert("id".to_string(), Value::String(id));
        }
        block.audit.write_into(&mut map);

        let tag = block.kind.as_str().to_string();
        let mut payload = block.payload;
        if !block.children.is_empty() {
            let children = block.children.into_iter().map(Value::from).collect();
            payload.insert("children".to_string(), Value::Array(children));
        }

        map.insert("type".to_string(), Value::String(tag.clone()));
        map.insert(tag, Value::Object(payload));
        map.insert("has_children".to_string(), Value::Bool(block.has_children));
        Value::Object(map)
    }
}

/// The `content` object of a `text`-typed rich text run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// One element of a `rich_text` or `caption` list
///
/// Only the two text fields the translator rewrites are typed; annotations,
/// links, mentions and equations pass through `rest` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl RichText {
    /// A plain `text` run with no annotations
    pub fn plain(content: &str) -> Self {
        let mut rest = Map::new();
        rest.insert("type".to_string(), json!("text"));
        Self {
            plain_text: content.to_string(),
            text: Some(TextContent {
                content: content.to_string(),
                rest: Map::new(),
            }),
            rest,
        }
    }

    /// Replace the rendered text, keeping `text.content` in sync
    pub fn set_text(&mut self, translated: String) {
        if let Some(text) = self.text.as_mut() {
            text.content = translated.clone();
        }
        self.plain_text = translated;
    }
}

/// A page as returned by the pages endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Page {
    pub id: Option<String>,
    pub url: Option<String>,
    pub parent: Value,
    pub properties: Map<String, Value>,
    pub audit: AuditFields,
    pub extra: Map<String, Value>,
}

impl TryFrom<Value> for Page {
    type Error = ModelError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut map) = value else {
            return Err(ModelError::NotAnObject);
        };

        let id = map
            .remove("id")
            .and_then(|id| id.as_str().map(str::to_string));
        let url = map
            .remove("url")
            .and_then(|url| url.as_str().map(str::to_string));
        let parent = map.remove("parent").unwrap_or(Value::Null);
        let properties = match map.remove("properties") {
            Some(Value::Object(properties)) => properties,
            _ => Map::new(),
        };
        let audit = AuditFields::take_from(&mut map);

        Ok(Page {
            id,
            url,
            parent,
            properties,
            audit,
            extra: map,
        })
    }
}

impl From<Page> for Value {
    fn from(page: Page) -> Self {
        let mut map = page.extra;
        if let Some(id) = page.id {
            map.insert("id".to_string(), Value::String(id));
        }
        if let Some(url) = page.url {
            map.insert("url".to_string(), Value::String(url));
        }
        page.audit.write_into(&mut map);
        if !page.parent.is_null() {
            map.insert("parent".to_string(), page.parent);
        }
        map.insert("properties".to_string(), Value::Object(page.properties));
        Value::Object(map)
    }
}

/// Creation payload for a new page, produced from a sanitized [`Page`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageDraft {
    pub parent: Value,
    pub properties: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Page> for PageDraft {
    fn from(page: Page) -> Self {
        Self {
            parent: page.parent,
            properties: page.properties,
            extra: page.extra,
        }
    }
}

/// A database, only ever resolved to confirm it exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of a children listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildrenPage {
    pub results: Vec<Block>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}
