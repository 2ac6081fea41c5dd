use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameConfigError {
    #[error("question count must be at least 1")]
    NoQuestions,

    #[error("time limit must not be zero")]
    ZeroTimeLimit,

    #[error("unknown game kind: {0}")]
    UnknownKind(String),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY ───────────────────────────────────────────────────────────────
//

/// Difficulty level of a game, driving option count, scoring and pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Number of options shown for each question at this difficulty.
    #[must_use]
    pub fn options_per_question(self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 4,
            Difficulty::Hard => 6,
        }
    }

    /// Base points awarded for a correct answer at this difficulty.
    #[must_use]
    pub fn base_score(self) -> u32 {
        match self {
            Difficulty::Easy => 50,
            Difficulty::Medium => 100,
            Difficulty::Hard => 150,
        }
    }

    /// Per-question time limit used when the config does not set one.
    #[must_use]
    pub fn default_time_limit(self) -> Duration {
        match self {
            Difficulty::Easy => Duration::from_secs(15),
            Difficulty::Medium => Duration::from_secs(10),
            Difficulty::Hard => Duration::from_secs(5),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = GameConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(GameConfigError::UnknownDifficulty(other.to_string())),
        }
    }
}

//
// ─── GAME KIND ────────────────────────────────────────────────────────────────
//

/// The kind of quiz being played.
///
/// Only `WhosThatPokemon` has a question builder today; the other kinds are
/// declared so persisted score records for them round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    WhosThatPokemon,
    PokemonTypes,
    PokemonAbilities,
}

impl GameKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GameKind::WhosThatPokemon => "whos_that_pokemon",
            GameKind::PokemonTypes => "pokemon_types",
            GameKind::PokemonAbilities => "pokemon_abilities",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = GameConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whos_that_pokemon" => Ok(Self::WhosThatPokemon),
            "pokemon_types" => Ok(Self::PokemonTypes),
            "pokemon_abilities" => Ok(Self::PokemonAbilities),
            other => Err(GameConfigError::UnknownKind(other.to_string())),
        }
    }
}

//
// ─── GAME STATUS ──────────────────────────────────────────────────────────────
//

/// Lifecycle state of a game as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

//
// ─── GAME CONFIG ──────────────────────────────────────────────────────────────
//

/// Immutable configuration chosen when a game starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    kind: GameKind,
    difficulty: Difficulty,
    question_count: u32,
    time_limit: Option<Duration>,
}

impl GameConfig {
    /// Build a validated config.
    ///
    /// # Errors
    ///
    /// Returns `GameConfigError::NoQuestions` if `question_count` is zero,
    /// or `GameConfigError::ZeroTimeLimit` for an explicit zero limit.
    pub fn new(
        kind: GameKind,
        difficulty: Difficulty,
        question_count: u32,
        time_limit: Option<Duration>,
    ) -> Result<Self, GameConfigError> {
        if question_count == 0 {
            return Err(GameConfigError::NoQuestions);
        }
        if time_limit.is_some_and(|limit| limit.is_zero()) {
            return Err(GameConfigError::ZeroTimeLimit);
        }

        Ok(Self {
            kind,
            difficulty,
            question_count,
            time_limit,
        })
    }

    #[must_use]
    pub fn kind(&self) -> GameKind {
        self.kind
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    /// The per-question time limit, falling back to the difficulty default.
    #[must_use]
    pub fn time_limit(&self) -> Duration {
        self.time_limit
            .unwrap_or_else(|| self.difficulty.default_time_limit())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_counts_follow_difficulty() {
        assert_eq!(Difficulty::Easy.options_per_question(), 3);
        assert_eq!(Difficulty::Medium.options_per_question(), 4);
        assert_eq!(Difficulty::Hard.options_per_question(), 6);
    }

    #[test]
    fn base_scores_follow_difficulty() {
        assert_eq!(Difficulty::Easy.base_score(), 50);
        assert_eq!(Difficulty::Medium.base_score(), 100);
        assert_eq!(Difficulty::Hard.base_score(), 150);
    }

    #[test]
    fn config_rejects_zero_questions() {
        let err =
            GameConfig::new(GameKind::WhosThatPokemon, Difficulty::Easy, 0, None).unwrap_err();
        assert!(matches!(err, GameConfigError::NoQuestions));
    }

    #[test]
    fn config_rejects_zero_time_limit() {
        let err = GameConfig::new(
            GameKind::WhosThatPokemon,
            Difficulty::Easy,
            5,
            Some(Duration::ZERO),
        )
        .unwrap_err();
        assert!(matches!(err, GameConfigError::ZeroTimeLimit));
    }

    #[test]
    fn time_limit_falls_back_to_difficulty_default() {
        let config =
            GameConfig::new(GameKind::WhosThatPokemon, Difficulty::Hard, 5, None).unwrap();
        assert_eq!(config.time_limit(), Duration::from_secs(5));

        let explicit = GameConfig::new(
            GameKind::WhosThatPokemon,
            Difficulty::Hard,
            5,
            Some(Duration::from_secs(20)),
        )
        .unwrap();
        assert_eq!(explicit.time_limit(), Duration::from_secs(20));
    }

    #[test]
    fn kind_and_difficulty_roundtrip_through_strings() {
        for kind in [
            GameKind::WhosThatPokemon,
            GameKind::PokemonTypes,
            GameKind::PokemonAbilities,
        ] {
            assert_eq!(kind.as_str().parse::<GameKind>().unwrap(), kind);
        }
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(
                difficulty.as_str().parse::<Difficulty>().unwrap(),
                difficulty
            );
        }
    }
}
