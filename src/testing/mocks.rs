//! Mock implementations of testing traits.
//!
//! These mocks provide controllable test doubles for the player seam,
//! enabling deterministic controller tests.

use super::traits::{PlayerCommand, PlayerHandle};
use crate::error::{RepriseError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Mock implementation of a media player.
///
/// Records every command it receives, in order. Thread-safe so it can be
/// shared with the controller's supervisor task.
///
/// # Example
///
/// ```rust,ignore
/// let player = Arc::new(MockPlayer::new());
/// player.seek(0.0).unwrap();
/// player.play().unwrap();
///
/// assert_eq!(player.commands(), vec![PlayerCommand::Seek(0.0), PlayerCommand::Play]);
/// ```
#[derive(Debug, Default)]
pub struct MockPlayer {
    commands: Mutex<Vec<PlayerCommand>>,
    unavailable: AtomicBool,
}

impl MockPlayer {
    /// Create a new mock that accepts every command.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to reject every command with `PlayerUnavailable`.
    ///
    /// Rejected commands are still recorded.
    #[must_use]
    pub fn with_unavailable(self) -> Self {
        self.unavailable.store(true, Ordering::SeqCst);
        self
    }

    /// Toggle availability after construction.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// All commands received so far.
    pub fn commands(&self) -> Vec<PlayerCommand> {
        self.lock().clone()
    }

    /// Forget recorded commands.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of `seek` commands targeting `seconds`.
    pub fn seek_count(&self, seconds: f64) -> usize {
        self.lock()
            .iter()
            .filter(|c| matches!(c, PlayerCommand::Seek(s) if *s == seconds))
            .count()
    }

    /// Number of `pause` commands.
    pub fn pause_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|c| matches!(c, PlayerCommand::Pause))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PlayerCommand>> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, command: PlayerCommand, name: &str) -> Result<()> {
        self.lock().push(command);
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RepriseError::player_unavailable(name))
        } else {
            Ok(())
        }
    }
}

impl PlayerHandle for MockPlayer {
    fn seek(&self, seconds: f64) -> Result<()> {
        self.record(PlayerCommand::Seek(seconds), "seek")
    }

    fn play(&self) -> Result<()> {
        self.record(PlayerCommand::Play, "play")
    }

    fn pause(&self) -> Result<()> {
        self.record(PlayerCommand::Pause, "pause")
    }
}
