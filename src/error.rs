//! Errors of a page translation run

use crate::mt::MtError;
use crate::notion::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("'{0}' does not contain a page id")]
    InvalidPageRef(String),

    #[error("{0} is a database. This tool currently supports only pages.")]
    NotAPage(String),

    #[error("Failed to read the page {id}: {source}")]
    Unreadable {
        id: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Translation(#[from] MtError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to append blocks after {accepted} accepted batch(es): {source}")]
    Submission {
        accepted: usize,
        #[source]
        source: StoreError,
    },

    #[error("The page has no title property")]
    MissingTitle,

    #[error("Malformed content: {0}")]
    Payload(String),
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Payload(err.to_string())
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
