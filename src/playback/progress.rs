//! User-facing progress reporting.
//!
//! The controller describes what just happened as a [`Transition`]; the
//! [`ProgressReporter`] turns it into a status line, an overlay update and,
//! once per bounded session, a completion signal.
//!
//! # Architecture
//!
//! ```text
//! Transition ──> ProgressReporter ──> Report ──┬──> ProgressSnapshot (watch)
//!                                              └──> ProgressEvent    (broadcast)
//! ```

use super::state::{RepeatSession, SessionId, SessionState};
use crate::error::ValidationError;
use crate::timecode::format_seconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a status message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    #[default]
    Info,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A status line for the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

impl StatusMessage {
    fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}

/// Persistent loop-progress indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    pub active: bool,
    pub current_count: u32,
    /// `0` for unbounded sessions.
    pub total_count: u32,
}

/// Something the controller just did.
#[derive(Debug, Clone, Copy)]
pub enum Transition<'a> {
    /// A running session was replaced by a new `start()`.
    Superseded,
    Started(&'a RepeatSession),
    /// A pass was counted and the loop continues.
    Progressed(&'a RepeatSession),
    Completed(&'a RepeatSession),
    Stopped,
    Rejected(ValidationError),
}

/// What the UI should show after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub status: StatusMessage,
    /// `None` leaves the overlay as it was.
    pub overlay: Option<Overlay>,
    /// Fire the one-shot completion effect.
    pub completion_signal: bool,
}

/// Translates controller transitions into reports.
///
/// Holds only whether completion has been signaled for the current session.
#[derive(Debug, Default)]
pub struct ProgressReporter {
    completion_signaled: bool,
}

impl ProgressReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether completion already fired for the current session.
    #[must_use]
    pub fn completion_signaled(&self) -> bool {
        self.completion_signaled
    }

    /// Produce the report for `transition`.
    ///
    /// # Example
    ///
    /// ```
    /// use reprise::playback::progress::{ProgressReporter, Severity, Transition};
    /// use reprise::playback::state::{RepeatParameters, RepeatSession};
    ///
    /// let mut reporter = ProgressReporter::new();
    /// let session = RepeatSession::new(RepeatParameters::new(0.0, 10.0, 3));
    ///
    /// let report = reporter.report(Transition::Started(&session));
    /// assert_eq!(report.status.severity, Severity::Success);
    /// assert_eq!(report.status.text, "Repeat started: 0:00 to 0:10, 3 times");
    /// ```
    pub fn report(&mut self, transition: Transition<'_>) -> Report {
        match transition {
            Transition::Superseded => Report {
                status: StatusMessage::new("Previous repeat replaced", Severity::Warning),
                overlay: None,
                completion_signal: false,
            },
            Transition::Started(session) => {
                self.completion_signaled = false;
                let params = &session.parameters;
                let count = if params.is_bounded() {
                    format!("{} times", params.planned_repeats)
                } else {
                    "infinite".to_string()
                };
                Report {
                    status: StatusMessage::new(
                        format!(
                            "Repeat started: {} to {}, {}",
                            format_seconds(params.start_time),
                            format_seconds(params.end_time),
                            count
                        ),
                        Severity::Success,
                    ),
                    overlay: Some(active_overlay(session)),
                    completion_signal: false,
                }
            }
            Transition::Progressed(session) => {
                let params = &session.parameters;
                let text = if params.is_bounded() {
                    format!(
                        "Repeat {}/{}",
                        session.completed_repeats, params.planned_repeats
                    )
                } else {
                    format!("Repeat {}", session.completed_repeats)
                };
                Report {
                    status: StatusMessage::new(text, Severity::Info),
                    overlay: Some(active_overlay(session)),
                    completion_signal: false,
                }
            }
            Transition::Completed(session) => {
                let fire = !self.completion_signaled;
                self.completion_signaled = true;
                Report {
                    status: StatusMessage::new(
                        format!(
                            "Repeat completed: {}/{}",
                            session.completed_repeats, session.parameters.planned_repeats
                        ),
                        Severity::Success,
                    ),
                    overlay: Some(Overlay {
                        active: false,
                        ..active_overlay(session)
                    }),
                    completion_signal: fire,
                }
            }
            Transition::Stopped => {
                self.completion_signaled = false;
                Report {
                    status: StatusMessage::new("Repeat stopped", Severity::Info),
                    overlay: Some(Overlay::default()),
                    completion_signal: false,
                }
            }
            Transition::Rejected(error) => Report {
                status: StatusMessage::new(error.to_string(), Severity::Error),
                overlay: None,
                completion_signal: false,
            },
        }
    }
}

fn active_overlay(session: &RepeatSession) -> Overlay {
    Overlay {
        active: true,
        current_count: session.completed_repeats,
        total_count: session.parameters.planned_repeats,
    }
}

/// A report stamped with the state it left the controller in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub state: SessionState,
    pub session_id: Option<SessionId>,
    pub report: Report,
    pub at: DateTime<Utc>,
}

/// The latest observable controller state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub state: SessionState,
    pub session_id: Option<SessionId>,
    pub status_message: String,
    pub status_severity: Severity,
    pub overlay_active: bool,
    pub current_count: u32,
    pub total_count: u32,
    /// True once the current session has signaled completion.
    pub completion_signal: bool,
    pub updated_at: DateTime<Utc>,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            session_id: None,
            status_message: String::new(),
            status_severity: Severity::Info,
            overlay_active: false,
            current_count: 0,
            total_count: 0,
            completion_signal: false,
            updated_at: Utc::now(),
        }
    }
}

impl ProgressSnapshot {
    /// Fold an event into the snapshot.
    pub fn apply(&mut self, event: &ProgressEvent, completion_signaled: bool) {
        self.state = event.state;
        self.session_id = event.session_id;
        self.status_message = event.report.status.text.clone();
        self.status_severity = event.report.status.severity;
        if let Some(overlay) = event.report.overlay {
            self.overlay_active = overlay.active;
            self.current_count = overlay.current_count;
            self.total_count = overlay.total_count;
        }
        self.completion_signal = completion_signaled;
        self.updated_at = event.at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::state::RepeatParameters;

    fn session(planned: u32) -> RepeatSession {
        RepeatSession::new(RepeatParameters::new(0.0, 10.0, planned))
    }

    #[test]
    fn test_started_bounded_and_infinite() {
        let mut reporter = ProgressReporter::new();

        let bounded = reporter.report(Transition::Started(&session(3)));
        assert!(bounded.status.text.ends_with("3 times"));
        assert_eq!(
            bounded.overlay,
            Some(Overlay {
                active: true,
                current_count: 0,
                total_count: 3
            })
        );

        let infinite = reporter.report(Transition::Started(&session(0)));
        assert!(infinite.status.text.ends_with("infinite"));
        assert_eq!(infinite.overlay.map(|o| o.total_count), Some(0));
    }

    #[test]
    fn test_progress_text() {
        let mut reporter = ProgressReporter::new();

        let mut bounded = session(3);
        bounded.record_crossing();
        let report = reporter.report(Transition::Progressed(&bounded));
        assert_eq!(report.status.text, "Repeat 1/3");
        assert_eq!(report.status.severity, Severity::Info);

        let mut unbounded = session(0);
        unbounded.record_crossing();
        unbounded.record_crossing();
        let report = reporter.report(Transition::Progressed(&unbounded));
        assert_eq!(report.status.text, "Repeat 2");
        assert_eq!(report.overlay.map(|o| o.current_count), Some(2));
    }

    #[test]
    fn test_completion_fires_once() {
        let mut reporter = ProgressReporter::new();
        let mut done = session(1);
        reporter.report(Transition::Started(&done));
        done.record_crossing();

        let first = reporter.report(Transition::Completed(&done));
        assert!(first.completion_signal);
        assert_eq!(first.status.text, "Repeat completed: 1/1");
        assert_eq!(first.overlay.map(|o| o.active), Some(false));

        let second = reporter.report(Transition::Completed(&done));
        assert!(!second.completion_signal);
        assert!(reporter.completion_signaled());
    }

    #[test]
    fn test_new_session_re_arms_completion() {
        let mut reporter = ProgressReporter::new();
        let mut done = session(1);
        done.record_crossing();
        assert!(reporter.report(Transition::Completed(&done)).completion_signal);

        reporter.report(Transition::Started(&session(1)));
        assert!(!reporter.completion_signaled());
        assert!(reporter.report(Transition::Completed(&done)).completion_signal);
    }

    #[test]
    fn test_stopped_clears_overlay() {
        let mut reporter = ProgressReporter::new();
        let report = reporter.report(Transition::Stopped);
        assert_eq!(report.status.text, "Repeat stopped");
        assert_eq!(report.overlay, Some(Overlay::default()));
    }

    #[test]
    fn test_rejected_and_superseded() {
        let mut reporter = ProgressReporter::new();

        let rejected = reporter.report(Transition::Rejected(ValidationError::EndNotAfterStart));
        assert_eq!(rejected.status.severity, Severity::Error);
        assert_eq!(rejected.status.text, "End time must be after start time");
        assert!(rejected.overlay.is_none());

        let replaced = reporter.report(Transition::Superseded);
        assert_eq!(replaced.status.severity, Severity::Warning);
        assert!(replaced.overlay.is_none());
    }

    #[test]
    fn test_snapshot_keeps_overlay_when_report_has_none() {
        let mut snapshot = ProgressSnapshot::default();
        let mut reporter = ProgressReporter::new();
        let running = session(2);

        let started = ProgressEvent {
            state: SessionState::Looping,
            session_id: Some(running.id),
            report: reporter.report(Transition::Started(&running)),
            at: Utc::now(),
        };
        snapshot.apply(&started, false);
        assert!(snapshot.overlay_active);
        assert_eq!(snapshot.total_count, 2);

        let rejected = ProgressEvent {
            state: SessionState::Looping,
            session_id: Some(running.id),
            report: reporter.report(Transition::Rejected(ValidationError::MissingEnd)),
            at: Utc::now(),
        };
        snapshot.apply(&rejected, false);
        assert!(snapshot.overlay_active);
        assert_eq!(snapshot.total_count, 2);
        assert_eq!(snapshot.status_severity, Severity::Error);
    }
}
