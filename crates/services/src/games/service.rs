use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

use quiz_core::model::{Answer, GameConfig, GameStatus, Question, ScoreRecord};
use quiz_core::scoring::score_for_answer;

use crate::error::GameError;
use super::progress::GameProgress;

//
// ─── ANSWER OUTCOME ────────────────────────────────────────────────────────────
//

/// Outcome of answering the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// Points added to the session score; zero for wrong or timed-out answers.
    pub awarded: u32,
}

//
// ─── GAME SESSION ──────────────────────────────────────────────────────────────
//

/// In-memory state machine for one quiz game.
///
/// Steps through a fixed question list, scoring answers as they land. All
/// mutations happen on the caller's event thread; the per-question answered
/// guard is the only synchronization this engine needs, so a user tap and a
/// timer expiry delivered back to back cannot double-score.
pub struct GameSession {
    config: GameConfig,
    status: GameStatus,
    questions: Vec<Question>,
    current: usize,
    score: u32,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    record_id: Option<uuid::Uuid>,
}

impl GameSession {
    /// Create a session over an already-built question list.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Empty` if no questions are provided.
    pub fn new(
        config: GameConfig,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        if questions.is_empty() {
            return Err(GameError::Empty);
        }

        Ok(Self {
            config,
            status: GameStatus::InProgress,
            questions,
            current: 0,
            score: 0,
            started_at,
            ended_at: None,
            record_id: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    #[must_use]
    pub fn record_id(&self) -> Option<uuid::Uuid> {
        self.record_id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == GameStatus::Completed
    }

    /// Number of questions already answered.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_answered()).count()
    }

    /// Number of questions answered with the correct option.
    #[must_use]
    pub fn correct_answers(&self) -> usize {
        self.questions.iter().filter(|q| q.is_correct()).count()
    }

    /// Returns a summary of the current game progress.
    #[must_use]
    pub fn progress(&self) -> GameProgress {
        let answered = self.answered_count();
        GameProgress {
            total: self.total_questions(),
            answered,
            remaining: self.total_questions().saturating_sub(answered),
            score: self.score,
            is_complete: self.is_complete(),
        }
    }

    /// Record the answer for the current question and score it.
    ///
    /// Returns `None` when the call is a defensive no-op: the session is not
    /// in progress, or the current question was already answered (a second
    /// tap or a stale timer expiry). Correct choices add
    /// `score_for_answer(...)`; timeouts and wrong or out-of-range choices
    /// add nothing.
    pub fn answer_current(&mut self, choice: Answer, time_spent: Duration) -> Option<AnswerOutcome> {
        if self.status != GameStatus::InProgress {
            return None;
        }
        let time_limit = self.config.time_limit();
        let difficulty = self.config.difficulty();
        let question = self.questions.get_mut(self.current)?;
        if !question.record_answer(choice, time_spent) {
            return None;
        }

        let correct = question.is_correct();
        let awarded = if correct {
            score_for_answer(difficulty, time_spent, time_limit)
        } else {
            0
        };
        self.score += awarded;

        Some(AnswerOutcome { correct, awarded })
    }

    /// Move to the next question, or finish the game from the last one.
    ///
    /// Returns the status after the call; a no-op unless in progress.
    pub fn advance(&mut self, now: DateTime<Utc>) -> GameStatus {
        if self.status != GameStatus::InProgress {
            return self.status;
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
        } else {
            self.finalize(now);
        }
        self.status
    }

    /// Finish the game, closing any gaps.
    ///
    /// Every unanswered question is force-marked as timed out with zero
    /// time spent, so abandoned questions count against accuracy but never
    /// toward the score. Idempotent after the first call.
    pub fn finalize(&mut self, now: DateTime<Utc>) {
        if self.status != GameStatus::InProgress {
            return;
        }

        for question in &mut self.questions {
            question.record_answer(Answer::TimedOut, Duration::ZERO);
        }

        self.ended_at = Some(now);
        self.status = GameStatus::Completed;
    }

    /// Derive the persisted record for a completed game.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Record` if the computed counts are inconsistent.
    pub fn build_record(&self, recorded_at: DateTime<Utc>) -> Result<ScoreRecord, GameError> {
        let total = u32::try_from(self.total_questions()).unwrap_or(u32::MAX);
        let correct = u32::try_from(self.correct_answers()).unwrap_or(u32::MAX);
        Ok(ScoreRecord::new(
            recorded_at,
            self.score,
            total,
            correct,
            self.config.kind(),
        )?)
    }

    pub(crate) fn set_record_id(&mut self, id: uuid::Uuid) {
        self.record_id = Some(id);
    }
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("status", &self.status)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("started_at", &self.started_at)
            .field("ended_at", &self.ended_at)
            .field("record_id", &self.record_id)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, Entry, EntryId, GameKind};
    use quiz_core::time::fixed_now;

    fn entry(id: u64) -> Entry {
        Entry::new(
            EntryId::new(id),
            format!("Entry {id}"),
            format!("https://img.example/{id}.png"),
        )
        .unwrap()
    }

    /// Question whose correct option always sits at index 0.
    fn question(id: u32, correct_id: u64) -> Question {
        let correct = entry(correct_id);
        let options = vec![correct.clone(), entry(correct_id + 100), entry(correct_id + 200)];
        Question::new(id, correct, options).unwrap()
    }

    fn session(difficulty: Difficulty, question_count: u32) -> GameSession {
        let config =
            GameConfig::new(GameKind::WhosThatPokemon, difficulty, question_count, None).unwrap();
        let questions = (1..=question_count)
            .map(|id| question(id, u64::from(id)))
            .collect();
        GameSession::new(config, questions, fixed_now()).unwrap()
    }

    #[test]
    fn empty_session_returns_error() {
        let config =
            GameConfig::new(GameKind::WhosThatPokemon, Difficulty::Easy, 1, None).unwrap();
        let err = GameSession::new(config, Vec::new(), fixed_now()).unwrap_err();
        assert!(matches!(err, GameError::Empty));
    }

    #[test]
    fn correct_answers_accumulate_score() {
        let mut session = session(Difficulty::Easy, 2);

        let outcome = session
            .answer_current(Answer::Choice(0), Duration::ZERO)
            .unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.awarded, 75);
        assert_eq!(session.score(), 75);

        session.advance(fixed_now());
        let outcome = session
            .answer_current(Answer::Choice(1), Duration::ZERO)
            .unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.awarded, 0);
        assert_eq!(session.score(), 75);
    }

    #[test]
    fn answering_twice_is_a_no_op() {
        let mut session = session(Difficulty::Medium, 1);

        let first = session.answer_current(Answer::Choice(0), Duration::ZERO);
        assert!(first.is_some());
        let score_after_first = session.score();

        let second = session.answer_current(Answer::Choice(0), Duration::ZERO);
        assert!(second.is_none());
        assert_eq!(session.score(), score_after_first);
    }

    #[test]
    fn timeout_never_scores() {
        let mut session = session(Difficulty::Hard, 1);
        let outcome = session
            .answer_current(Answer::TimedOut, Duration::from_secs(5))
            .unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.awarded, 0);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn advance_walks_to_completion() {
        let mut session = session(Difficulty::Easy, 3);
        assert_eq!(session.current_index(), 0);

        assert_eq!(session.advance(fixed_now()), GameStatus::InProgress);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.advance(fixed_now()), GameStatus::InProgress);
        assert_eq!(session.advance(fixed_now()), GameStatus::Completed);
        assert!(session.is_complete());
        assert_eq!(session.ended_at(), Some(fixed_now()));

        // Further advances change nothing.
        assert_eq!(session.advance(fixed_now()), GameStatus::Completed);
    }

    #[test]
    fn finalize_closes_all_gaps_as_timeouts() {
        let mut session = session(Difficulty::Medium, 4);
        session.answer_current(Answer::Choice(0), Duration::ZERO);
        session.advance(fixed_now());

        session.finalize(fixed_now());
        assert!(session.is_complete());
        assert!(session.questions().iter().all(Question::is_answered));

        for question in session.questions().iter().skip(1) {
            let recorded = question.answer().unwrap();
            assert_eq!(recorded.choice, Answer::TimedOut);
            assert_eq!(recorded.time_spent, Duration::ZERO);
        }
        assert_eq!(session.correct_answers(), 1);
    }

    #[test]
    fn answers_after_completion_are_ignored() {
        let mut session = session(Difficulty::Easy, 1);
        session.finalize(fixed_now());
        assert!(
            session
                .answer_current(Answer::Choice(0), Duration::ZERO)
                .is_none()
        );
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn easy_game_answered_instantly_scores_full_bonus() {
        // Five EASY questions at 75 points each: base 50 plus the full
        // speed bonus of 25.
        let mut session = session(Difficulty::Easy, 5);

        for _ in 0..5 {
            let outcome = session
                .answer_current(Answer::Choice(0), Duration::ZERO)
                .unwrap();
            assert!(outcome.correct);
            assert_eq!(outcome.awarded, 75);
            session.advance(fixed_now());
        }

        assert!(session.is_complete());
        assert_eq!(session.score(), 375);

        let record = session.build_record(fixed_now()).unwrap();
        assert_eq!(record.score(), 375);
        assert_eq!(record.total_questions(), 5);
        assert_eq!(record.correct_answers(), 5);
        assert_eq!(record.kind(), GameKind::WhosThatPokemon);
    }

    #[test]
    fn mixed_outcome_counts_only_correct_answers() {
        // Ten MEDIUM questions: six answered correctly halfway through the
        // 10s limit (125 points each), four left to time out.
        let mut session = session(Difficulty::Medium, 10);

        for index in 0..10 {
            if index < 6 {
                let outcome = session
                    .answer_current(Answer::Choice(0), Duration::from_secs(5))
                    .unwrap();
                assert_eq!(outcome.awarded, 125);
            }
            session.advance(fixed_now());
        }

        assert!(session.is_complete());
        assert_eq!(session.score(), 750);
        assert_eq!(session.correct_answers(), 6);

        let record = session.build_record(fixed_now()).unwrap();
        assert_eq!(record.score(), 750);
        assert_eq!(record.correct_answers(), 6);
        assert_eq!(record.total_questions(), 10);
    }

    #[test]
    fn score_is_monotonically_non_decreasing() {
        let mut session = session(Difficulty::Hard, 4);
        let mut last = 0;

        let answers = [
            Answer::Choice(0),
            Answer::TimedOut,
            Answer::Choice(2),
            Answer::Choice(9),
        ];
        for answer in answers {
            session.answer_current(answer, Duration::from_secs(1));
            assert!(session.score() >= last);
            last = session.score();
            session.advance(fixed_now());
        }
    }
}
