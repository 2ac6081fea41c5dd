//! Fire-and-forget audio cues.
//!
//! The engine invokes these at well-defined points (after scoring, after a
//! game ends, around the in-progress phase) and never depends on their
//! success or completion.

/// Audio collaborator contract.
pub trait GameAudio: Send + Sync {
    fn on_correct(&self) {}
    fn on_incorrect(&self) {}
    fn on_game_over(&self) {}
    fn start_ambient(&self) {}
    fn stop_ambient(&self) {}
}

/// Silent implementation for tests and headless play.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl GameAudio for NullAudio {}
