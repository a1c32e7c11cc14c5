//! Error types for Story Studio operations.
//!
//! Every failure the studio can report is a variant of [`StudioError`]. None
//! of them are fatal to an interactive session: the project record is always
//! left in its last-known-good state and the user may retry.

use crate::state::{Action, Stage};
use std::path::PathBuf;
use thiserror::Error;

/// Comprehensive error types for Story Studio operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StudioError {
    // Session errors
    /// The agent backend could not be initialized; the studio runs degraded.
    #[error("agent session unavailable: {0}")]
    SessionUnavailable(String),

    // Workflow errors
    /// The requested action is not legal from the session's active stage.
    #[error("cannot {action} while the project is in {stage}")]
    IllegalTransition {
        /// Active stage of the session.
        stage: Stage,
        /// Action that was attempted.
        action: Action,
    },

    /// A field the action depends on is empty.
    #[error("missing prerequisite: {0}")]
    MissingPrerequisite(&'static str),

    // Project errors
    /// No project exists with the given id.
    #[error("project not found: {0}")]
    ProjectNotFound(i64),

    // Agent errors
    /// The external generative-text service call failed.
    #[error("agent invocation failed: {0}")]
    Invocation(String),

    /// The editor answered with something that is not a review payload.
    #[error("could not parse editor response: {reason}")]
    MalformedReview {
        /// Why parsing failed.
        reason: String,
        /// The raw response, kept for inspection.
        raw: String,
    },

    // Storage errors
    /// SQLite error from the project store.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    // Config errors
    /// Error parsing configuration file.
    #[error("config parse error in {path}: {message}")]
    ConfigParseError {
        /// Path to the offending config file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Invalid configuration value.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    // Prompt/template errors
    /// Prompt rendering failed.
    #[error(transparent)]
    Prompt(#[from] studio_pm::PromptError),

    // IO and system errors
    /// Standard IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context from anyhow.
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl StudioError {
    /// Whether the error should be shown as a warning rather than an error.
    ///
    /// Warnings are raised before anything is invoked or written.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            StudioError::IllegalTransition { .. } | StudioError::MissingPrerequisite(_)
        )
    }

    /// The raw agent response attached to the error, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            StudioError::MalformedReview { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Result type alias for Story Studio operations.
pub type Result<T> = std::result::Result<T, StudioError>;
