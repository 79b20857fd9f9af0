//! Repeat-loop playback control.
//!
//! This module contains the components that replay a time window on an
//! external player:
//!
//! - [`boundary`] - Pure boundary crossing classification with hysteresis
//! - [`state`] - Session, phase and sample types
//! - [`controller`] - The repeat-loop state machine
//! - [`supervisor`] - Interval-driven polling task
//! - [`progress`] - Status, overlay and completion reporting
//! - [`operations`] - Simulated player used by the CLI
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  tick   ┌─────────────────────┐ classify ┌──────────────────┐
//! │ Supervisor   │────────>│ RepeatLoopController│─────────>│ BoundaryDetector │
//! └──────────────┘         │                     │          └──────────────────┘
//!                          │                     │ report   ┌──────────────────┐
//!   PositionSample ───────>│                     │─────────>│ ProgressReporter │
//!                          └─────────────────────┘          └──────────────────┘
//!                                     │ seek / play / pause
//!                                     v
//!                             ┌──────────────┐
//!                             │ PlayerHandle │
//!                             └──────────────┘
//! ```

pub mod boundary;
pub mod controller;
pub mod operations;
pub mod progress;
pub mod state;
pub mod supervisor;

// Re-exports for convenience
pub use boundary::{BoundaryDetector, Classification, Window};
pub use controller::RepeatLoopController;
pub use operations::SimulatedPlayer;
pub use progress::{
    Overlay, ProgressEvent, ProgressReporter, ProgressSnapshot, Report, Severity, StatusMessage,
    Transition,
};
pub use state::{
    LoopPhase, PositionSample, RepeatParameters, RepeatSession, SessionId, SessionState,
};
