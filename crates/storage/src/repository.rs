use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

use quiz_core::model::{GameKind, ScoreRecord};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the persisted score history.
///
/// The history is append-only: records are written once when a game
/// completes and read back for display, never updated.
#[async_trait]
pub trait ScoreHistoryRepository: Send + Sync {
    /// Append a completed game's record to the history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a record with the same id already
    /// exists, or other storage errors.
    async fn append_record(&self, record: &ScoreRecord) -> Result<(), StorageError>;

    /// Fetch a record by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_record(&self, id: Uuid) -> Result<ScoreRecord, StorageError>;

    /// List records, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_records(&self, limit: u32) -> Result<Vec<ScoreRecord>, StorageError>;

    /// List records for one game kind, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_records_for_kind(
        &self,
        kind: GameKind,
        limit: u32,
    ) -> Result<Vec<ScoreRecord>, StorageError>;
}

/// Simple in-memory history implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryScoreHistory {
    records: Arc<Mutex<Vec<ScoreRecord>>>,
}

impl InMemoryScoreHistory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ScoreHistoryRepository for InMemoryScoreHistory {
    async fn append_record(&self, record: &ScoreRecord) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.iter().any(|existing| existing.id() == record.id()) {
            return Err(StorageError::Conflict);
        }
        guard.push(record.clone());
        Ok(())
    }

    async fn get_record(&self, id: Uuid) -> Result<ScoreRecord, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|record| record.id() == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_records(&self, limit: u32) -> Result<Vec<ScoreRecord>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut records: Vec<ScoreRecord> = guard.clone();
        records.sort_by_key(|record| std::cmp::Reverse(record.recorded_at()));
        records.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(records)
    }

    async fn list_records_for_kind(
        &self,
        kind: GameKind,
        limit: u32,
    ) -> Result<Vec<ScoreRecord>, StorageError> {
        let mut records: Vec<ScoreRecord> = self
            .list_records(u32::MAX)
            .await?
            .into_iter()
            .filter(|record| record.kind() == kind)
            .collect();
        records.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(records)
    }
}

/// Aggregates the score history behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub records: Arc<dyn ScoreHistoryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            records: Arc::new(InMemoryScoreHistory::new()),
        }
    }
}
