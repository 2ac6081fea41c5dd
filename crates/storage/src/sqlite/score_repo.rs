use sqlx::Row;
use uuid::Uuid;

use quiz_core::model::{GameKind, ScoreRecord};

use super::SqliteRepository;
use crate::repository::{ScoreHistoryRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn map_record_row(row: &sqlx::sqlite::SqliteRow) -> Result<ScoreRecord, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let id = Uuid::parse_str(&id).map_err(ser)?;
    let recorded_at = row.try_get("recorded_at").map_err(ser)?;
    let score = u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?;
    let total_questions = u32_from_i64(
        "total_questions",
        row.try_get::<i64, _>("total_questions").map_err(ser)?,
    )?;
    let correct_answers = u32_from_i64(
        "correct_answers",
        row.try_get::<i64, _>("correct_answers").map_err(ser)?,
    )?;
    let kind: String = row.try_get("game_kind").map_err(ser)?;
    let kind: GameKind = kind.parse().map_err(ser)?;

    ScoreRecord::from_persisted(id, recorded_at, score, total_questions, correct_answers, kind)
        .map_err(ser)
}

#[async_trait::async_trait]
impl ScoreHistoryRepository for SqliteRepository {
    async fn append_record(&self, record: &ScoreRecord) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO score_records (
                    id, recorded_at, score, total_questions, correct_answers, game_kind
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO NOTHING
            ",
        )
        .bind(record.id().to_string())
        .bind(record.recorded_at())
        .bind(i64::from(record.score()))
        .bind(i64::from(record.total_questions()))
        .bind(i64::from(record.correct_answers()))
        .bind(record.kind().as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }
        Ok(())
    }

    async fn get_record(&self, id: Uuid) -> Result<ScoreRecord, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, recorded_at, score, total_questions, correct_answers, game_kind
                FROM score_records
                WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_record_row(&row)
    }

    async fn list_records(&self, limit: u32) -> Result<Vec<ScoreRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, recorded_at, score, total_questions, correct_answers, game_kind
                FROM score_records
                ORDER BY recorded_at DESC, id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_record_row(&row)?);
        }
        Ok(out)
    }

    async fn list_records_for_kind(
        &self,
        kind: GameKind,
        limit: u32,
    ) -> Result<Vec<ScoreRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, recorded_at, score, total_questions, correct_answers, game_kind
                FROM score_records
                WHERE game_kind = ?1
                ORDER BY recorded_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(kind.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_record_row(&row)?);
        }
        Ok(out)
    }
}
