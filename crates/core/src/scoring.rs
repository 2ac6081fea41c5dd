//! Pure scoring for answered questions.

use std::time::Duration;

use crate::model::Difficulty;

/// Points for a correct answer, rewarding speed on top of the difficulty base.
///
/// The award is `base + floor(base * 0.5 * (1 - time_spent/time_limit))`,
/// with the time ratio clamped to `[0, 1]`: an instant answer earns one and
/// a half times the base, and answers at or beyond the limit earn exactly
/// the base, never less.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn score_for_answer(
    difficulty: Difficulty,
    time_spent: Duration,
    time_limit: Duration,
) -> u32 {
    let base = difficulty.base_score();

    let ratio = if time_limit.is_zero() {
        0.0
    } else {
        (1.0 - time_spent.as_secs_f64() / time_limit.as_secs_f64()).clamp(0.0, 1.0)
    };

    let bonus = (f64::from(base) * 0.5 * ratio).floor() as u32;
    base + bonus
}
