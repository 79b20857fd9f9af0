//! Custom error types for Reprise.
//!
//! This module provides structured error types for validation, player
//! command failures and configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// Why a repeat request was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The window end is missing (zero or negative).
    #[error("End time is required")]
    MissingEnd,

    /// The window end does not come after the window start.
    #[error("End time must be after start time")]
    EndNotAfterStart,

    /// The window start is negative or a bound is not a finite number.
    #[error("Start time must be a non-negative number")]
    InvalidStart,
}

impl ValidationError {
    /// Stable identifier used in logs and JSON output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingEnd => "missingEnd",
            Self::EndNotAfterStart => "endNotAfterStart",
            Self::InvalidStart => "invalidStart",
        }
    }
}

/// Main error type for Reprise operations
#[derive(Error, Debug)]
pub enum RepriseError {
    // =========================================================================
    // Request Errors
    // =========================================================================
    /// A repeat request failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Player Errors
    // =========================================================================
    /// A command was issued while no player was ready
    #[error("Player unavailable for '{command}'")]
    PlayerUnavailable { command: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RepriseError {
    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    /// Create a player-unavailable error for the named command
    pub fn player_unavailable(command: impl Into<String>) -> Self {
        Self::PlayerUnavailable {
            command: command.into(),
        }
    }

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::PlayerUnavailable { .. } => 3,
            Self::Config { .. } | Self::InvalidConfig { .. } => 7,
            _ => 1,
        }
    }
}

/// Type alias for Reprise results
pub type Result<T> = std::result::Result<T, RepriseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        assert_eq!(
            ValidationError::EndNotAfterStart.to_string(),
            "End time must be after start time"
        );
        assert_eq!(ValidationError::MissingEnd.to_string(), "End time is required");
    }

    #[test]
    fn test_validation_kind() {
        assert_eq!(ValidationError::MissingEnd.kind(), "missingEnd");
        assert_eq!(ValidationError::EndNotAfterStart.kind(), "endNotAfterStart");
        assert_eq!(ValidationError::InvalidStart.kind(), "invalidStart");
    }

    #[test]
    fn test_validation_wraps() {
        let err: RepriseError = ValidationError::MissingEnd.into();
        assert!(matches!(
            err,
            RepriseError::Validation(ValidationError::MissingEnd)
        ));
        assert!(err.to_string().contains("End time is required"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            RepriseError::from(ValidationError::MissingEnd).exit_code(),
            2
        );
        assert_eq!(RepriseError::player_unavailable("play").exit_code(), 3);
        assert_eq!(
            RepriseError::config_with_path("test", PathBuf::from("c.toml")).exit_code(),
            7
        );
        let io = RepriseError::from(std::io::Error::other("disk"));
        assert_eq!(io.exit_code(), 1);
    }

    #[test]
    fn test_config_with_path() {
        let path = PathBuf::from("/test/config.toml");
        let err = RepriseError::config_with_path("failed to parse", path.clone());
        if let RepriseError::Config {
            message,
            path: opt_path,
        } = err
        {
            assert_eq!(message, "failed to parse");
            assert_eq!(opt_path, Some(path));
        } else {
            panic!("Wrong error variant");
        }
    }
}
