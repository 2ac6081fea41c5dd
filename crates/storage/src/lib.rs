#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryScoreHistory, ScoreHistoryRepository, Storage, StorageError};
pub use sqlite::{SqliteInitError, SqliteRepository};
