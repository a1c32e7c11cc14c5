//! Studio Core - Execution engine for Story Studio.
//!
//! This crate drives a story idea through four departments (research,
//! writing, editorial review and storyboarding), each backed by a call to a
//! generative-text agent, and keeps every project in a SQLite table.
//!
//! # Architecture
//!
//! - [`state`]: stage derivation and the session state machine
//! - [`store`]: the project store trait and its SQLite implementation
//! - [`agents`]: the agent facade and its backends
//! - [`workflows`]: one function per user action
//! - [`runtime`]: the [`Studio`] that ties them together
//! - [`config`] and [`error`]: settings and error types
//!
//! # Example
//!
//! ```rust
//! use studio_core::{Action, Project, Session, Stage};
//!
//! let project = Project::draft(1, "A robot chef on Mars", "2026-01-01 09:00:00");
//! let session = Session::open(project);
//! assert_eq!(session.stage, Stage::Research);
//! assert!(session.check(Action::Write).is_err());
//! ```

pub mod agents;
pub mod config;
pub mod error;
pub mod project;
pub mod review;
pub mod runtime;
pub mod state;
pub mod store;
pub mod workflows;

// Re-export core types for convenience
pub use agents::{AgentBackend, AgentRequest, Crew, Role};
pub use config::{AgentConfig, AgentMode, RetryPolicy, RoleModes, StudioConfig};
pub use error::{Result, StudioError};
pub use project::{Project, ProjectSummary};
pub use review::ReviewVerdict;
pub use runtime::Studio;
pub use state::{Action, Outcome, Session, Stage};
pub use store::{Field, ProjectStore};
