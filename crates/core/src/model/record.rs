use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::GameKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreRecordError {
    #[error("record covers no questions")]
    Empty,

    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CountMismatch { correct: u32, total: u32 },
}

/// Persisted result of one completed game.
///
/// Created once when a game completes and appended to the score history;
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    id: Uuid,
    recorded_at: DateTime<Utc>,
    score: u32,
    total_questions: u32,
    correct_answers: u32,
    kind: GameKind,
}

impl ScoreRecord {
    /// Build a record for a freshly completed game, generating its id.
    ///
    /// # Errors
    ///
    /// Returns `ScoreRecordError::Empty` for a zero-question record, or
    /// `ScoreRecordError::CountMismatch` if more answers are correct than
    /// questions exist.
    pub fn new(
        recorded_at: DateTime<Utc>,
        score: u32,
        total_questions: u32,
        correct_answers: u32,
        kind: GameKind,
    ) -> Result<Self, ScoreRecordError> {
        Self::from_persisted(
            Uuid::new_v4(),
            recorded_at,
            score,
            total_questions,
            correct_answers,
            kind,
        )
    }

    /// Rehydrate a record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ScoreRecordError` if the counts do not align.
    pub fn from_persisted(
        id: Uuid,
        recorded_at: DateTime<Utc>,
        score: u32,
        total_questions: u32,
        correct_answers: u32,
        kind: GameKind,
    ) -> Result<Self, ScoreRecordError> {
        if total_questions == 0 {
            return Err(ScoreRecordError::Empty);
        }
        if correct_answers > total_questions {
            return Err(ScoreRecordError::CountMismatch {
                correct: correct_answers,
                total: total_questions,
            });
        }

        Ok(Self {
            id,
            recorded_at,
            score,
            total_questions,
            correct_answers,
            kind,
        })
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn kind(&self) -> GameKind {
        self.kind
    }

    /// Fraction of questions answered correctly, in `[0, 1]`.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        f64::from(self.correct_answers) / f64::from(self.total_questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn rejects_empty_record() {
        let err =
            ScoreRecord::new(fixed_now(), 0, 0, 0, GameKind::WhosThatPokemon).unwrap_err();
        assert!(matches!(err, ScoreRecordError::Empty));
    }

    #[test]
    fn rejects_more_correct_than_total() {
        let err =
            ScoreRecord::new(fixed_now(), 500, 5, 6, GameKind::WhosThatPokemon).unwrap_err();
        assert!(matches!(
            err,
            ScoreRecordError::CountMismatch {
                correct: 6,
                total: 5
            }
        ));
    }

    #[test]
    fn accuracy_is_a_fraction() {
        let record =
            ScoreRecord::new(fixed_now(), 375, 5, 4, GameKind::WhosThatPokemon).unwrap();
        assert!((record.accuracy() - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn persisted_roundtrip_keeps_fields() {
        let record =
            ScoreRecord::new(fixed_now(), 750, 10, 6, GameKind::WhosThatPokemon).unwrap();
        let reloaded = ScoreRecord::from_persisted(
            record.id(),
            record.recorded_at(),
            record.score(),
            record.total_questions(),
            record.correct_answers(),
            record.kind(),
        )
        .unwrap();
        assert_eq!(reloaded, record);
    }
}
