#![forbid(unsafe_code)]

pub mod audio;
pub mod catalog;
pub mod error;
pub mod games;

pub use quiz_core::Clock;

pub use audio::{GameAudio, NullAudio};
pub use catalog::{CatalogPage, CatalogSource, PokeApiCatalog, StaticCatalog};
pub use error::{CatalogError, GameError};

pub use games::{
    AnswerOutcome, GameController, GameProgress, GameResults, GameSession, GameSnapshot,
    QuestionTimer, QuestionView, ScoreHistoryItem, ScoreHistoryService, TimerExpired,
};
