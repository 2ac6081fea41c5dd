//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{EntryError, GameConfigError, GameKind, QuestionError, ScoreRecordError};
use storage::repository::StorageError;

/// Errors emitted by catalog sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("malformed catalog entry: {0}")]
    MalformedEntry(String),
    #[error(transparent)]
    Entry(#[from] EntryError),
}

/// Errors emitted by the game engine and its controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GameError {
    #[error("no questions available for game")]
    Empty,
    #[error("catalog returned {got} usable entries, need at least {need}")]
    InsufficientCatalog { got: usize, need: usize },
    #[error("no question builder for game kind {0}")]
    UnsupportedKind(GameKind),
    #[error(transparent)]
    Config(#[from] GameConfigError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Record(#[from] ScoreRecordError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
