use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Emitted once when a question's countdown runs out.
///
/// Carries the question id so a consumer can drop expiries that arrive
/// after the game already moved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerExpired {
    pub question_id: u32,
}

const TICK: Duration = Duration::from_millis(100);

struct ActiveCountdown {
    question_id: u32,
    limit: Duration,
    deadline: Instant,
    token: CancellationToken,
}

/// Per-question countdown, owned by the game controller.
///
/// `start` replaces any running countdown; on the deadline the timer sends
/// exactly one `TimerExpired` on the provided channel and stops itself.
/// `cancel` guarantees no further ticks and no expiry event from the
/// cancelled countdown.
#[derive(Default)]
pub struct QuestionTimer {
    active: Arc<Mutex<Option<ActiveCountdown>>>,
}

impl QuestionTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the countdown for a question.
    pub fn start(&self, question_id: u32, limit: Duration, events: UnboundedSender<TimerExpired>) {
        self.cancel();

        let token = CancellationToken::new();
        let deadline = Instant::now() + limit;

        if let Ok(mut guard) = self.active.lock() {
            *guard = Some(ActiveCountdown {
                question_id,
                limit,
                deadline,
                token: token.clone(),
            });
        }

        let active = Arc::clone(&self.active);
        tokio::spawn(async move {
            let mut ticker = time::interval(TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if Instant::now() >= deadline {
                            let _ = events.send(TimerExpired { question_id });
                            if let Ok(mut guard) = active.lock() {
                                if guard.as_ref().is_some_and(|a| a.question_id == question_id) {
                                    *guard = None;
                                }
                            }
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Stop the running countdown, if any. No expiry will be delivered.
    pub fn cancel(&self) {
        let Ok(mut guard) = self.active.lock() else {
            return;
        };
        if let Some(countdown) = guard.take() {
            countdown.token.cancel();
        }
    }

    /// Time left on the running countdown, zero when idle.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        let Ok(guard) = self.active.lock() else {
            return Duration::ZERO;
        };
        guard
            .as_ref()
            .map(|countdown| countdown.deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }

    /// Time the current question has been on screen, zero when idle.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        let Ok(guard) = self.active.lock() else {
            return Duration::ZERO;
        };
        guard
            .as_ref()
            .map(|countdown| {
                countdown
                    .limit
                    .saturating_sub(countdown.deadline.saturating_duration_since(Instant::now()))
            })
            .unwrap_or(Duration::ZERO)
    }
}

impl Drop for QuestionTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
