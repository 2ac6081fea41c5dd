use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use quiz_core::Clock;
use quiz_core::model::{GameKind, ScoreRecord};
use storage::repository::ScoreHistoryRepository;

use crate::error::GameError;

/// Presentation-agnostic list item for a persisted score record.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no localization assumptions
///
/// The UI may format timestamps and percentages as needed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreHistoryItem {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,

    pub score: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub kind: GameKind,
    pub accuracy: f64,
}

impl ScoreHistoryItem {
    #[must_use]
    pub fn from_record(record: &ScoreRecord) -> Self {
        Self {
            id: record.id(),
            recorded_at: record.recorded_at(),
            score: record.score(),
            total_questions: record.total_questions(),
            correct_answers: record.correct_answers(),
            kind: record.kind(),
            accuracy: record.accuracy(),
        }
    }
}

/// Presentation-facing score history facade that hides repositories and
/// time from the UI.
#[derive(Clone)]
pub struct ScoreHistoryService {
    clock: Clock,
    records: Arc<dyn ScoreHistoryRepository>,
}

impl ScoreHistoryService {
    #[must_use]
    pub fn new(clock: Clock, records: Arc<dyn ScoreHistoryRepository>) -> Self {
        Self { clock, records }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(
            clock,
            Arc::new(storage::repository::InMemoryScoreHistory::new()),
        )
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Load the most recent score records.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Storage` on repository failures.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<ScoreHistoryItem>, GameError> {
        let records = self.records.list_records(limit).await?;
        Ok(records.iter().map(ScoreHistoryItem::from_record).collect())
    }

    /// Load the most recent score records for one game kind.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Storage` on repository failures.
    pub async fn list_recent_for_kind(
        &self,
        kind: GameKind,
        limit: u32,
    ) -> Result<Vec<ScoreHistoryItem>, GameError> {
        let records = self.records.list_records_for_kind(kind, limit).await?;
        Ok(records.iter().map(ScoreHistoryItem::from_record).collect())
    }

    /// Fetch a score record by id.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Storage` when the record is missing or storage fails.
    pub async fn get(&self, id: Uuid) -> Result<ScoreRecord, GameError> {
        Ok(self.records.get_record(id).await?)
    }
}
