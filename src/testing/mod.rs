//! Testing infrastructure for Reprise.
//!
//! This module provides the player trait, a recording mock and assertions
//! for testing the controller without a real playback surface.
//!
//! # Architecture
//!
//! - **Traits**: The [`PlayerHandle`] seam the controller drives
//! - **Mocks**: [`MockPlayer`], which records every command
//! - **Assertions**: Checks over recorded commands and snapshots
//!
//! # Example
//!
//! ```rust,ignore
//! use reprise::testing::{MockPlayer, PlayerCommand, assert_commands};
//!
//! let player = Arc::new(MockPlayer::new());
//! let controller = RepeatLoopController::new(player.clone(), Default::default())?;
//! controller.start(0.0, 10.0, 1)?;
//!
//! assert_commands(&player, &[PlayerCommand::Seek(0.0), PlayerCommand::Play]);
//! ```

pub mod assertions;
pub mod mocks;
pub mod traits;

// Re-export commonly used types
pub use assertions::*;
pub use mocks::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Mock Player Tests
    // =========================================================================

    #[test]
    fn test_mock_player_default_accepts_commands() {
        let player = MockPlayer::default();
        assert!(player.seek(1.0).is_ok());
        assert!(player.play().is_ok());
        assert!(player.pause().is_ok());
        assert_eq!(player.commands().len(), 3);
    }

    #[test]
    fn test_mock_player_with_unavailable() {
        let player = MockPlayer::new().with_unavailable();
        let err = player.play().unwrap_err();
        assert!(err.to_string().contains("play"));
        // Rejected commands are still recorded
        assert_eq!(player.commands(), vec![PlayerCommand::Play]);

        player.set_unavailable(false);
        assert!(player.pause().is_ok());
    }

    #[test]
    fn test_mock_player_counts() {
        let player = MockPlayer::new();
        player.seek(0.0).unwrap();
        player.seek(2.0).unwrap();
        player.pause().unwrap();
        player.pause().unwrap();
        assert_eq!(player.seek_count(0.0), 1);
        assert_eq!(player.pause_count(), 2);

        player.clear();
        assert!(player.commands().is_empty());
    }
}
