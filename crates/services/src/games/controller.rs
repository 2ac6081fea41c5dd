use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use quiz_core::Clock;
use quiz_core::model::{Answer, GameConfig, GameStatus, Question};
use storage::repository::ScoreHistoryRepository;

use crate::audio::GameAudio;
use crate::catalog::CatalogSource;
use crate::error::GameError;
use super::builder::{QuestionSetBuilder, pool_fetch_size};
use super::progress::GameProgress;
use super::service::GameSession;
use super::timer::{QuestionTimer, TimerExpired};

//
// ─── SNAPSHOT TYPES ───────────────────────────────────────────────────────────
//

/// Presentation-agnostic view of one question.
///
/// Correctness-revealing fields (`correct_option`, `is_correct`) stay empty
/// until the question is answered, so a renderer cannot leak the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub id: u32,
    pub image_url: String,
    pub options: Vec<String>,
    pub answered: bool,
    pub selected: Option<Answer>,
    pub correct_option: Option<usize>,
    pub is_correct: Option<bool>,
}

impl QuestionView {
    fn from_question(question: &Question) -> Self {
        let answered = question.is_answered();
        Self {
            id: question.id(),
            image_url: question.correct().image_url().to_string(),
            options: question
                .options()
                .iter()
                .map(|option| option.name().to_string())
                .collect(),
            answered,
            selected: question.answer().map(|recorded| recorded.choice),
            correct_option: answered.then(|| question.correct_option()),
            is_correct: answered.then(|| question.is_correct()),
        }
    }
}

/// Final statistics once a game completes.
#[derive(Debug, Clone, PartialEq)]
pub struct GameResults {
    pub score: u32,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub accuracy: f64,
    pub questions: Vec<QuestionView>,
}

/// Read-only snapshot of the controller state, rebuilt on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub status: GameStatus,
    pub is_loading: bool,
    pub failure: Option<String>,
    pub score: u32,
    /// 1-based position of the current question; zero without a game.
    pub question_number: usize,
    pub total_questions: usize,
    pub is_last_question: bool,
    pub time_remaining: Duration,
    pub question: Option<QuestionView>,
    pub progress: Option<GameProgress>,
    pub results: Option<GameResults>,
}

//
// ─── CONTROLLER ───────────────────────────────────────────────────────────────
//

/// Owns the game session for one active game screen.
///
/// The session is a plain value here, never shared global state; the
/// presentation layer renders `snapshot()` output and feeds user input and
/// timer expiries back in on a single logical event thread.
pub struct GameController {
    clock: Clock,
    catalog: Arc<dyn CatalogSource>,
    records: Arc<dyn ScoreHistoryRepository>,
    audio: Arc<dyn GameAudio>,
    timer: QuestionTimer,
    timer_events: UnboundedSender<TimerExpired>,
    session: Option<GameSession>,
    failure: Option<String>,
    loading: bool,
}

impl GameController {
    /// Build a controller plus the receiver its countdown expiries arrive on.
    ///
    /// The caller's event loop reads the receiver and hands each event to
    /// `on_timer_expired`, keeping all session mutations on one thread.
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<dyn CatalogSource>,
        records: Arc<dyn ScoreHistoryRepository>,
        audio: Arc<dyn GameAudio>,
    ) -> (Self, UnboundedReceiver<TimerExpired>) {
        let (timer_events, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            clock,
            catalog,
            records,
            audio,
            timer: QuestionTimer::new(),
            timer_events,
            session: None,
            failure: None,
            loading: false,
        };
        (controller, receiver)
    }

    /// Start a new game, replacing any previous one.
    ///
    /// A second call while the catalog fetch is still in flight is ignored.
    /// On failure the controller keeps the message for `Failed` snapshots;
    /// the caller may simply start another game.
    ///
    /// # Errors
    ///
    /// Returns `GameError` when the catalog fetch fails or cannot seed
    /// enough questions.
    pub async fn start_game(&mut self, config: GameConfig) -> Result<(), GameError> {
        if self.loading {
            log::warn!("start_game called while another start is in flight; ignoring");
            return Ok(());
        }

        self.timer.cancel();
        self.loading = true;
        let result = self.build_session(config).await;
        self.loading = false;

        match result {
            Ok(session) => {
                self.failure = None;
                self.session = Some(session);
                self.audio.start_ambient();
                self.start_question_timer();
                Ok(())
            }
            Err(err) => {
                self.session = None;
                self.failure = Some(err.to_string());
                self.audio.stop_ambient();
                Err(err)
            }
        }
    }

    async fn build_session(&self, config: GameConfig) -> Result<GameSession, GameError> {
        let page = self
            .catalog
            .fetch_entries(pool_fetch_size(&config), 0)
            .await?;
        let questions = QuestionSetBuilder::new(&config).build(page.entries)?;
        GameSession::new(config, questions, self.clock.now())
    }

    /// Apply the player's option pick to the current question.
    ///
    /// Time spent comes from the countdown; answering twice, or answering
    /// with no game in progress, is a logged no-op.
    pub fn answer(&mut self, option_index: usize) {
        let time_spent = self.timer.elapsed();
        self.timer.cancel();

        let Some(session) = self.session.as_mut() else {
            log::debug!("answer with no active game; ignoring");
            return;
        };

        match session.answer_current(Answer::Choice(option_index), time_spent) {
            Some(outcome) if outcome.correct => self.audio.on_correct(),
            Some(_) => self.audio.on_incorrect(),
            None => log::debug!("answer for an already-resolved question; ignoring"),
        }
    }

    /// Handle a countdown expiry.
    ///
    /// Stale events (a different question, an already-answered one, or a
    /// finished game) are dropped; the answered guard on the question makes
    /// the tap-versus-expiry race safe either way.
    pub fn on_timer_expired(&mut self, event: TimerExpired) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.status() != GameStatus::InProgress {
            return;
        }

        let is_current_unanswered = session
            .current_question()
            .is_some_and(|question| question.id() == event.question_id && !question.is_answered());
        if !is_current_unanswered {
            log::debug!(
                "stale timer expiry for question {}; ignoring",
                event.question_id
            );
            return;
        }

        let limit = session.config().time_limit();
        if session.answer_current(Answer::TimedOut, limit).is_some() {
            self.audio.on_incorrect();
        }
    }

    /// Move on from the current question; from the last one this finishes
    /// the game and persists its score record.
    pub async fn next(&mut self) {
        self.timer.cancel();

        let Some(session) = self.session.as_mut() else {
            log::debug!("next with no active game; ignoring");
            return;
        };

        match session.advance(self.clock.now()) {
            GameStatus::Completed => self.complete_game().await,
            GameStatus::InProgress => self.start_question_timer(),
            _ => {}
        }
    }

    /// Finish the game early, marking unanswered questions as timed out.
    pub async fn end_game(&mut self) {
        self.timer.cancel();

        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.finalize(self.clock.now());
        self.complete_game().await;
    }

    /// Discard the game (and any failure); always legal.
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.audio.stop_ambient();
        self.session = None;
        self.failure = None;
    }

    /// Time left on the current question's countdown.
    #[must_use]
    pub fn time_remaining(&self) -> Duration {
        self.timer.remaining()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Build the read-only snapshot the presentation layer renders from.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn snapshot(&self) -> GameSnapshot {
        let Some(session) = self.session.as_ref() else {
            let status = if self.failure.is_some() {
                GameStatus::Failed
            } else {
                GameStatus::NotStarted
            };
            return GameSnapshot {
                status,
                is_loading: self.loading,
                failure: self.failure.clone(),
                score: 0,
                question_number: 0,
                total_questions: 0,
                is_last_question: false,
                time_remaining: Duration::ZERO,
                question: None,
                progress: None,
                results: None,
            };
        };

        let total = session.total_questions();
        let results = session.is_complete().then(|| GameResults {
            score: session.score(),
            total_questions: total,
            correct_answers: session.correct_answers(),
            accuracy: if total == 0 {
                0.0
            } else {
                session.correct_answers() as f64 / total as f64
            },
            questions: session
                .questions()
                .iter()
                .map(QuestionView::from_question)
                .collect(),
        });

        GameSnapshot {
            status: session.status(),
            is_loading: self.loading,
            failure: None,
            score: session.score(),
            question_number: session.current_index() + 1,
            total_questions: total,
            is_last_question: session.current_index() + 1 == total,
            time_remaining: self.timer.remaining(),
            question: session.current_question().map(QuestionView::from_question),
            progress: Some(session.progress()),
            results,
        }
    }

    fn start_question_timer(&self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.status() != GameStatus::InProgress {
            return;
        }
        let Some(question) = session.current_question() else {
            return;
        };
        if question.is_answered() {
            return;
        }

        self.timer.start(
            question.id(),
            session.config().time_limit(),
            self.timer_events.clone(),
        );
    }

    /// Completion tail, run exactly once per game: persist the record, then
    /// fire the end-of-game audio cues. A failed append is absorbed; the
    /// player still sees the finished game.
    async fn complete_game(&mut self) {
        let record = {
            let Some(session) = self.session.as_ref() else {
                return;
            };
            if !session.is_complete() || session.record_id().is_some() {
                return;
            }
            match session.build_record(self.clock.now()) {
                Ok(record) => record,
                Err(err) => {
                    log::warn!("could not build score record: {err}");
                    self.audio.on_game_over();
                    self.audio.stop_ambient();
                    return;
                }
            }
        };

        match self.records.append_record(&record).await {
            Ok(()) => {
                if let Some(session) = self.session.as_mut() {
                    session.set_record_id(record.id());
                }
            }
            Err(err) => {
                log::warn!("score history append failed, result shown anyway: {err}");
            }
        }

        self.audio.on_game_over();
        self.audio.stop_ambient();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
