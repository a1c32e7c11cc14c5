//! Persistent project store.
//!
//! [`ProjectStore`] is the storage seam. [`SqliteStore`] is the real one;
//! [`MemoryStore`] backs tests.
//!
//! [`SqliteStore`]: sqlite_impl::SqliteStore
//! [`MemoryStore`]: memory_mock::MemoryStore

pub mod memory_mock;
pub mod sqlite_impl;

use crate::error::Result;
use crate::project::{Project, ProjectSummary};
use std::fmt;

/// Text columns a single workflow step may overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `research_output`, written by the research stage and brief edits.
    ResearchOutput,
    /// `script_content`, written by the writing stage.
    ScriptContent,
    /// `storyboard_output`, written by the production stage.
    StoryboardOutput,
}

impl Field {
    /// Column name in the `projects` table.
    pub fn column(&self) -> &'static str {
        match self {
            Field::ResearchOutput => "research_output",
            Field::ScriptContent => "script_content",
            Field::StoryboardOutput => "storyboard_output",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Durable storage for projects.
///
/// Every write touches one field group and is atomic on its own; the
/// workflow never needs a transaction spanning several writes.
pub trait ProjectStore: Send + fmt::Debug {
    /// Inserts a project holding only `original_idea` and defaults.
    ///
    /// # Returns
    ///
    /// The new project id. Ids are never reused.
    fn create(&self, original_idea: &str) -> Result<i64>;

    /// Loads a project, or `None` if the id is unknown.
    fn load(&self, id: i64) -> Result<Option<Project>>;

    /// Overwrites one text field.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::ProjectNotFound` if the id is unknown.
    fn update_field(&self, id: i64, field: Field, value: &str) -> Result<()>;

    /// Records a review: feedback, score and approval in one write, and
    /// bumps the review counter.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::ProjectNotFound` if the id is unknown.
    fn update_review_stats(&self, id: i64, feedback: &str, score: u8, approved: bool)
    -> Result<()>;

    /// Lists every project, newest first.
    fn list_all(&self) -> Result<Vec<ProjectSummary>>;
}
