use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::model::{Entry, EntryId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question has no options")]
    NoOptions,

    #[error("correct entry appears {count} times among the options, expected exactly once")]
    CorrectOptionMiscount { count: usize },
}

/// How the player resolved a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    /// The player picked the option at this index.
    Choice(usize),
    /// The countdown expired before any option was picked.
    TimedOut,
}

/// An answer together with how long the question was on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedAnswer {
    pub choice: Answer,
    pub time_spent: Duration,
}

/// One question in a game: a correct entry hidden among shuffled options.
///
/// Answers are final: `record_answer` refuses a second call so that a user
/// tap and a timer expiry racing through the event queue cannot both land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: u32,
    correct: Entry,
    options: Vec<Entry>,
    answer: Option<RecordedAnswer>,
}

impl Question {
    /// Build a question, checking that exactly one option is the correct entry.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::NoOptions` for an empty option list, or
    /// `QuestionError::CorrectOptionMiscount` if the correct entry does not
    /// appear exactly once among the options.
    pub fn new(id: u32, correct: Entry, options: Vec<Entry>) -> Result<Self, QuestionError> {
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }

        let count = options.iter().filter(|o| o.id() == correct.id()).count();
        if count != 1 {
            return Err(QuestionError::CorrectOptionMiscount { count });
        }

        Ok(Self {
            id,
            correct,
            options,
            answer: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn correct(&self) -> &Entry {
        &self.correct
    }

    #[must_use]
    pub fn options(&self) -> &[Entry] {
        &self.options
    }

    /// Index of the correct entry among the options.
    #[must_use]
    pub fn correct_option(&self) -> usize {
        self.options
            .iter()
            .position(|o| o.id() == self.correct.id())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn answer(&self) -> Option<&RecordedAnswer> {
        self.answer.as_ref()
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }

    /// True once the question is answered with the correct option.
    ///
    /// Timed-out and out-of-range choices are never correct.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        match self.answer {
            Some(RecordedAnswer {
                choice: Answer::Choice(index),
                ..
            }) => self
                .options
                .get(index)
                .is_some_and(|option| option.id() == self.correct.id()),
            _ => false,
        }
    }

    /// Record the player's answer.
    ///
    /// Returns `false` (leaving the question untouched) if the question is
    /// already answered.
    pub fn record_answer(&mut self, choice: Answer, time_spent: Duration) -> bool {
        if self.answer.is_some() {
            return false;
        }
        self.answer = Some(RecordedAnswer { choice, time_spent });
        true
    }

    /// Helper for matching an answered option against the correct entry id.
    #[must_use]
    pub fn option_id(&self, index: usize) -> Option<EntryId> {
        self.options.get(index).map(Entry::id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
