mod builder;
mod controller;
mod progress;
mod service;
mod timer;
mod view;

// Public API of the game subsystem.
pub use crate::error::GameError;
pub use builder::{QuestionSetBuilder, pool_fetch_size};
pub use controller::{GameController, GameResults, GameSnapshot, QuestionView};
pub use progress::GameProgress;
pub use service::{AnswerOutcome, GameSession};
pub use timer::{QuestionTimer, TimerExpired};
pub use view::{ScoreHistoryItem, ScoreHistoryService};
