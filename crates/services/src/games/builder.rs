use rand::rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use quiz_core::model::{Entry, EntryId, GameConfig, GameKind, Question};

use crate::error::GameError;

/// Suggested catalog fetch size for a config.
///
/// Three candidates per question keeps distractor picks varied while one
/// page comfortably covers the pool; the floor guarantees enough distinct
/// distractors even for single-question games at high difficulty.
#[must_use]
pub fn pool_fetch_size(config: &GameConfig) -> u32 {
    let options = u32::try_from(config.difficulty().options_per_question()).unwrap_or(u32::MAX);
    (config.question_count().saturating_mul(3)).max(options.saturating_mul(2))
}

/// Builds a question set from a candidate pool of catalog entries.
pub struct QuestionSetBuilder<'a> {
    config: &'a GameConfig,
}

impl<'a> QuestionSetBuilder<'a> {
    #[must_use]
    pub fn new(config: &'a GameConfig) -> Self {
        Self { config }
    }

    /// Build the session's questions.
    ///
    /// The pool is deduplicated by entry id and uniformly shuffled; the
    /// first `question_count` entries become the correct answers (distinct
    /// by construction). Each question's distractors are drawn from the
    /// rest of the pool and the combined options are shuffled again so the
    /// correct position is uniform.
    ///
    /// # Errors
    ///
    /// Returns `GameError::UnsupportedKind` for kinds without a builder,
    /// or `GameError::InsufficientCatalog` when the pool cannot provide
    /// enough distinct correct answers and distractors.
    pub fn build(self, pool: Vec<Entry>) -> Result<Vec<Question>, GameError> {
        if self.config.kind() != GameKind::WhosThatPokemon {
            return Err(GameError::UnsupportedKind(self.config.kind()));
        }

        let mut seen: HashSet<EntryId> = HashSet::new();
        let mut candidates: Vec<Entry> = pool
            .into_iter()
            .filter(|entry| seen.insert(entry.id()))
            .collect();

        let question_count = usize::try_from(self.config.question_count()).unwrap_or(usize::MAX);
        let options_count = self.config.difficulty().options_per_question();
        let need = question_count.max(options_count);
        if candidates.len() < need {
            return Err(GameError::InsufficientCatalog {
                got: candidates.len(),
                need,
            });
        }

        let mut rng = rng();
        candidates.as_mut_slice().shuffle(&mut rng);

        let mut questions = Vec::with_capacity(question_count);
        for (index, correct) in candidates.iter().take(question_count).enumerate() {
            let mut distractors: Vec<Entry> = candidates
                .iter()
                .filter(|entry| entry.id() != correct.id())
                .cloned()
                .collect();
            distractors.as_mut_slice().shuffle(&mut rng);
            distractors.truncate(options_count - 1);

            let mut options = distractors;
            options.push(correct.clone());
            options.as_mut_slice().shuffle(&mut rng);

            let id = u32::try_from(index + 1).unwrap_or(u32::MAX);
            questions.push(Question::new(id, correct.clone(), options)?);
        }

        Ok(questions)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Difficulty;

    fn build_pool(count: u64) -> Vec<Entry> {
        (1..=count)
            .map(|id| {
                Entry::new(
                    EntryId::new(id),
                    format!("Entry {id}"),
                    format!("https://img.example/{id}.png"),
                )
                .unwrap()
            })
            .collect()
    }

    fn config(difficulty: Difficulty, question_count: u32) -> GameConfig {
        GameConfig::new(GameKind::WhosThatPokemon, difficulty, question_count, None).unwrap()
    }

    #[test]
    fn every_question_has_exactly_one_correct_option() {
        let config = config(Difficulty::Medium, 10);
        let questions = QuestionSetBuilder::new(&config)
            .build(build_pool(40))
            .unwrap();

        for question in &questions {
            let matches = question
                .options()
                .iter()
                .filter(|option| option.id() == question.correct().id())
                .count();
            assert_eq!(matches, 1);
        }
    }

    #[test]
    fn option_count_follows_difficulty() {
        for (difficulty, expected) in [
            (Difficulty::Easy, 3),
            (Difficulty::Medium, 4),
            (Difficulty::Hard, 6),
        ] {
            let config = config(difficulty, 5);
            let questions = QuestionSetBuilder::new(&config)
                .build(build_pool(30))
                .unwrap();
            assert_eq!(questions.len(), 5);
            assert!(questions.iter().all(|q| q.options().len() == expected));
        }
    }

    #[test]
    fn correct_answers_are_distinct_within_a_session() {
        let config = config(Difficulty::Easy, 20);
        let questions = QuestionSetBuilder::new(&config)
            .build(build_pool(25))
            .unwrap();

        let mut ids = HashSet::new();
        for question in &questions {
            assert!(ids.insert(question.correct().id()));
        }
    }

    #[test]
    fn question_ids_are_sequential_from_one() {
        let config = config(Difficulty::Easy, 5);
        let questions = QuestionSetBuilder::new(&config)
            .build(build_pool(10))
            .unwrap();
        let ids: Vec<u32> = questions.iter().map(Question::id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn rejects_short_pool() {
        let config = config(Difficulty::Hard, 2);
        // HARD needs 6 options, so a pool of 5 cannot fill a single question.
        let err = QuestionSetBuilder::new(&config)
            .build(build_pool(5))
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::InsufficientCatalog { got: 5, need: 6 }
        ));
    }

    #[test]
    fn deduplicates_pool_before_counting() {
        let config = config(Difficulty::Easy, 3);
        let mut pool = build_pool(2);
        pool.extend(build_pool(2));
        let err = QuestionSetBuilder::new(&config).build(pool).unwrap_err();
        assert!(matches!(
            err,
            GameError::InsufficientCatalog { got: 2, need: 3 }
        ));
    }

    #[test]
    fn rejects_unsupported_kinds() {
        let config =
            GameConfig::new(GameKind::PokemonTypes, Difficulty::Easy, 5, None).unwrap();
        let err = QuestionSetBuilder::new(&config)
            .build(build_pool(30))
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::UnsupportedKind(GameKind::PokemonTypes)
        ));
    }

    #[test]
    fn pool_fetch_size_scales_with_questions() {
        assert_eq!(pool_fetch_size(&config(Difficulty::Easy, 10)), 30);
        // Single-question hard game still asks for enough distractor variety.
        assert_eq!(pool_fetch_size(&config(Difficulty::Hard, 1)), 12);
    }
}
