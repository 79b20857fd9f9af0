//! Reprise - time-range repeat-loop controller
//!
//! Drives an external media player to replay a window `[start, end)` a
//! bounded or unbounded number of times, from a noisy, asynchronously
//! delivered position feed.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`playback`] - Boundary detection, the loop controller and progress reporting
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Custom error types and handling
//! - [`timecode`] - Parsing and formatting of playback positions
//! - [`testing`] - The player trait, mocks and assertions
//!
//! # Example
//!
//! ```rust,ignore
//! use reprise::playback::RepeatLoopController;
//! use reprise::testing::MockPlayer;
//! use std::sync::Arc;
//!
//! let controller = RepeatLoopController::new(Arc::new(MockPlayer::new()), Default::default())?;
//! controller.start(0.0, 10.0, 3)?;
//!
//! // The player bridge pushes samples; the supervisor polls them.
//! controller.on_position_sample(10.1, 180.0);
//!
//! let mut updates = controller.subscribe();
//! updates.changed().await?;
//! println!("{}", updates.borrow().status_message);
//! ```

pub mod config;
pub mod error;
pub mod playback;
pub mod testing;
pub mod timecode;

// Re-export commonly used types
pub use error::{RepriseError, Result, ValidationError};

// Re-export config types
pub use config::{ControllerConfig, RepriseConfig, SimulationConfig};

// Re-export playback types
pub use playback::{
    BoundaryDetector, ProgressEvent, ProgressSnapshot, RepeatLoopController, RepeatParameters,
    SessionState, Severity, SimulatedPlayer, Window,
};

// Re-export testing types for convenience
pub use testing::{MockPlayer, PlayerCommand, PlayerHandle};

pub use timecode::Timecode;
