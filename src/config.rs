//! Environment configuration shared by the CLI and the server

use crate::mt::deepl::DEEPL_TOKEN_VAR;
use crate::notion::client::NOTION_TOKEN_VAR;
use thiserror::Error;
use tracing::debug;

/// Port the server listens on when `PORT` is unset
pub const DEFAULT_PORT: u16 = 10000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "This tool requires a valid Notion API token. Head to https://www.notion.so/my-integrations, create a new app with \"Read Content\" and \"Insert Content\" in \"Content Capabilities\" section, plus \"Read user information without email addresses\" in \"User Capabilities\" section, and then share your Notion page with the app. Once you get a token, set NOTION_API_TOKEN env variable to the token value."
    )]
    MissingNotionToken,

    #[error(
        "This tool requires a DeepL API token. Head to https://www.deepl.com/pro-api, sign up, and grab your API token. Once you get a token, set DEEPL_API_TOKEN env variable to the token value."
    )]
    MissingDeeplToken,

    #[error("Invalid PORT value '{0}'")]
    InvalidPort(String),
}

/// How `.env` values combine with the process environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotenvMode {
    /// `.env` wins over variables already set
    Override,
    /// Variables already set win over `.env`
    Fill,
}

/// Load `.env` from the working directory or its parents, if there is one
pub fn load_dotenv(mode: DotenvMode) {
    let loaded = match mode {
        DotenvMode::Override => dotenvy::dotenv_override(),
        DotenvMode::Fill => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(err) => debug!("No .env loaded: {}", err),
    }
}

/// API tokens of the two services
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub notion_token: String,
    /// `None` when the caller does not need DeepL
    pub deepl_token: Option<String>,
}

impl Credentials {
    pub fn from_env(require_deepl: bool) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok(), require_deepl)
    }

    /// Read tokens through `lookup`; blank values count as missing
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        require_deepl: bool,
    ) -> Result<Self, ConfigError> {
        let present = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let notion_token = present(NOTION_TOKEN_VAR).ok_or(ConfigError::MissingNotionToken)?;
        let deepl_token = present(DEEPL_TOKEN_VAR);
        if require_deepl && deepl_token.is_none() {
            return Err(ConfigError::MissingDeeplToken);
        }

        Ok(Self {
            notion_token,
            deepl_token,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("notion_token", &"***")
            .field("deepl_token", &self.deepl_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Server port from `PORT`, or [`DEFAULT_PORT`]
pub fn server_port() -> Result<u16, ConfigError> {
    port_from(std::env::var("PORT").ok())
}

fn port_from(value: Option<String>) -> Result<u16, ConfigError> {
    match value {
        None => Ok(DEFAULT_PORT),
        Some(value) if value.trim().is_empty() => Ok(DEFAULT_PORT),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort(value)),
    }
}
