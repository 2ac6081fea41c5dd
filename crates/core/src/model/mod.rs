mod config;
mod entry;
mod ids;
mod question;
mod record;

pub use config::{Difficulty, GameConfig, GameConfigError, GameKind, GameStatus};
pub use entry::{Entry, EntryError};
pub use ids::EntryId;
pub use question::{Answer, Question, QuestionError, RecordedAnswer};
pub use record::{ScoreRecord, ScoreRecordError};
