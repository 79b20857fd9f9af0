//! Repeat session types and transitions.
//!
//! This module defines the data the controller mutates on every tick:
//! the session itself, the phase it is in, and the position samples that
//! drive it.

use super::boundary::Window;
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Externally visible lifecycle state.
///
/// # Example
///
/// ```
/// use reprise::playback::state::SessionState;
///
/// assert_eq!(SessionState::Looping.to_string(), "looping");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No session
    #[default]
    Idle,
    /// Accepted; seek and play are being issued
    Armed,
    /// Supervisor is watching for boundary crossings
    Looping,
    /// Bounded target reached
    Completed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Armed => write!(f, "armed"),
            SessionState::Looping => write!(f, "looping"),
            SessionState::Completed => write!(f, "completed"),
        }
    }
}

/// Identifier of one started session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The parameters of an accepted repeat request.
///
/// This is what a "save this configuration" collaborator reads back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepeatParameters {
    pub start_time: f64,
    pub end_time: f64,
    /// `0` loops until stopped.
    pub planned_repeats: u32,
}

impl RepeatParameters {
    #[must_use]
    pub fn new(start_time: f64, end_time: f64, planned_repeats: u32) -> Self {
        Self {
            start_time,
            end_time,
            planned_repeats,
        }
    }

    /// Check the window before any state is touched.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvalidStart`] when a bound is not finite or the
    ///   start is negative
    /// - [`ValidationError::MissingEnd`] when the end is zero or negative
    /// - [`ValidationError::EndNotAfterStart`] when `end <= start`
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.start_time.is_finite() || !self.end_time.is_finite() || self.start_time < 0.0 {
            return Err(ValidationError::InvalidStart);
        }
        if self.end_time <= 0.0 {
            return Err(ValidationError::MissingEnd);
        }
        if self.end_time <= self.start_time {
            return Err(ValidationError::EndNotAfterStart);
        }
        Ok(())
    }

    #[must_use]
    pub fn window(&self) -> Window {
        Window::new(self.start_time, self.end_time)
    }

    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.planned_repeats > 0
    }
}

/// One position report from the player bridge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub current_time: f64,
    pub duration: f64,
}

impl PositionSample {
    #[must_use]
    pub fn new(current_time: f64, duration: f64) -> Self {
        Self {
            current_time,
            duration,
        }
    }

    /// Whether the position can be classified at all.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.current_time.is_finite() && self.current_time >= 0.0
    }
}

/// Configuration and progress of one repeat run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatSession {
    pub id: SessionId,
    pub parameters: RepeatParameters,
    /// Passes counted so far.
    pub completed_repeats: u32,
    /// Debounce flag: a crossing was already counted for the current pass.
    pub crossed_since_last_seek: bool,
    pub started_at: DateTime<Utc>,
}

impl RepeatSession {
    /// Create a session from validated parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use reprise::playback::state::{RepeatParameters, RepeatSession};
    ///
    /// let session = RepeatSession::new(RepeatParameters::new(0.0, 10.0, 3));
    /// assert_eq!(session.completed_repeats, 0);
    /// assert!(!session.is_target_reached());
    /// ```
    #[must_use]
    pub fn new(parameters: RepeatParameters) -> Self {
        Self {
            id: SessionId::new(),
            parameters,
            completed_repeats: 0,
            crossed_since_last_seek: false,
            started_at: Utc::now(),
        }
    }

    /// Count a pass and mark it debounced.
    pub fn record_crossing(&mut self) {
        self.completed_repeats = self.completed_repeats.saturating_add(1);
        self.crossed_since_last_seek = true;
    }

    /// Re-arm detection for the next pass.
    pub fn reset_debounce(&mut self) {
        self.crossed_since_last_seek = false;
    }

    /// A bounded session has counted all planned passes.
    #[must_use]
    pub fn is_target_reached(&self) -> bool {
        self.parameters.is_bounded() && self.completed_repeats >= self.parameters.planned_repeats
    }
}

/// Controller phase; each active phase owns its session.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoopPhase {
    #[default]
    Idle,
    Armed(RepeatSession),
    Looping(RepeatSession),
    Completed(RepeatSession),
}

impl LoopPhase {
    #[must_use]
    pub fn state(&self) -> SessionState {
        match self {
            LoopPhase::Idle => SessionState::Idle,
            LoopPhase::Armed(_) => SessionState::Armed,
            LoopPhase::Looping(_) => SessionState::Looping,
            LoopPhase::Completed(_) => SessionState::Completed,
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&RepeatSession> {
        match self {
            LoopPhase::Idle => None,
            LoopPhase::Armed(s) | LoopPhase::Looping(s) | LoopPhase::Completed(s) => Some(s),
        }
    }

    /// Advance Armed to Looping; other phases are returned unchanged.
    #[must_use]
    pub fn into_looping(self) -> Self {
        match self {
            LoopPhase::Armed(session) => LoopPhase::Looping(session),
            other => other,
        }
    }
}
