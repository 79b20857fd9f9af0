//! Custom assertions for domain-specific testing.
//!
//! Provides expressive assertions over the commands a [`MockPlayer`]
//! received and the snapshots a controller published.

use super::mocks::MockPlayer;
use super::traits::PlayerCommand;
use crate::playback::progress::ProgressSnapshot;
use crate::playback::state::SessionState;

/// Assert that the player received exactly `expected`, in order.
///
/// # Panics
///
/// Panics with both command lists if they differ.
///
/// # Example
///
/// ```rust,ignore
/// controller.start(0.0, 10.0, 1)?;
/// assert_commands(&player, &[PlayerCommand::Seek(0.0), PlayerCommand::Play]);
/// ```
pub fn assert_commands(player: &MockPlayer, expected: &[PlayerCommand]) {
    let actual = player.commands();
    assert_eq!(
        actual, expected,
        "Player commands differ.\nExpected: {:?}\nActual:   {:?}",
        expected, actual
    );
}

/// Assert the number of seeks to `seconds`.
///
/// # Panics
///
/// Panics if the count doesn't match.
pub fn assert_seek_count(player: &MockPlayer, seconds: f64, expected: usize) {
    let actual = player.seek_count(seconds);
    assert_eq!(
        actual,
        expected,
        "Expected {} seeks to {}, but got {}.\nCommands: {:?}",
        expected,
        seconds,
        actual,
        player.commands()
    );
}

/// Assert the state and repeat counters of a snapshot.
///
/// # Panics
///
/// Panics if any of the three values differ.
pub fn assert_progress(
    snapshot: &ProgressSnapshot,
    state: SessionState,
    current_count: u32,
    total_count: u32,
) {
    assert_eq!(
        (snapshot.state, snapshot.current_count, snapshot.total_count),
        (state, current_count, total_count),
        "Unexpected progress. Status: '{}' ({})",
        snapshot.status_message,
        snapshot.status_severity
    );
}
