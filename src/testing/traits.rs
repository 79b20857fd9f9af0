//! Trait definitions for the player seam.
//!
//! The controller never talks to a concrete media player. It drives an
//! injected [`PlayerHandle`], which lets tests substitute a recording mock
//! and lets the CLI substitute a simulated playhead.

use crate::error::Result;

/// Commands the controller issues to an external media player.
///
/// Every command is fire-and-forget: returning `Ok(())` means the command
/// was handed to the player, not that it has taken effect. Implementations
/// may return [`RepriseError::PlayerUnavailable`](crate::error::RepriseError::PlayerUnavailable)
/// when no player is ready; the controller logs and tolerates it.
///
/// Implementations may push position samples back into the controller from
/// inside a command, but must not call `start()` or `stop()` from there.
///
/// # Example
///
/// ```rust,ignore
/// use reprise::testing::PlayerHandle;
///
/// fn restart(player: &impl PlayerHandle, at: f64) -> reprise::Result<()> {
///     player.seek(at)?;
///     player.play()
/// }
/// ```
pub trait PlayerHandle: Send + Sync {
    /// Move the playhead to `seconds`.
    ///
    /// # Errors
    ///
    /// Returns an error if no player is ready to accept the command.
    fn seek(&self, seconds: f64) -> Result<()>;

    /// Start or resume playback.
    ///
    /// # Errors
    ///
    /// Returns an error if no player is ready to accept the command.
    fn play(&self) -> Result<()>;

    /// Pause playback.
    ///
    /// # Errors
    ///
    /// Returns an error if no player is ready to accept the command.
    fn pause(&self) -> Result<()>;
}

/// A command as recorded by test doubles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    Seek(f64),
    Play,
    Pause,
}

impl std::fmt::Display for PlayerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seek(seconds) => write!(f, "seek({})", seconds),
            Self::Play => write!(f, "play"),
            Self::Pause => write!(f, "pause"),
        }
    }
}
