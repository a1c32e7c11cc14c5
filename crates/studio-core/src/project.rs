//! The project record and its derived values.

use serde::{Deserialize, Serialize};

/// Feedback value of a project that has never been reviewed.
pub const NO_FEEDBACK_YET: &str = "Initial Draft - No feedback yet.";

/// Project names keep this many characters of the original idea.
pub const NAME_MAX_CHARS: usize = 30;

/// A single story project, as stored in the `projects` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Stable identifier assigned by the store.
    pub id: i64,

    /// Creation timestamp, `YYYY-MM-DD HH:MM:SS`.
    pub created_at: String,

    /// Short label derived from the idea.
    pub name: String,

    /// The user's idea. Never changes after creation.
    pub original_idea: String,

    /// Output of the research stage.
    pub research_brief: String,

    /// Current script draft. Each writing pass overwrites it.
    pub script_content: String,

    /// Critique from the most recent review.
    pub editor_feedback: String,

    /// Score from the most recent review, 0-10.
    pub editor_score: u8,

    /// Whether the editor approved the current draft.
    pub is_approved: bool,

    /// Number of reviews that produced a parseable verdict.
    pub review_count: u32,

    /// Markdown storyboard from the production stage.
    pub storyboard_output: String,
}

impl Project {
    /// A fresh, unsaved project holding only the idea and the defaults.
    pub fn draft(id: i64, original_idea: impl Into<String>, created_at: impl Into<String>) -> Self {
        let original_idea = original_idea.into();
        Self {
            id,
            created_at: created_at.into(),
            name: project_name(&original_idea),
            original_idea,
            research_brief: String::new(),
            script_content: String::new(),
            editor_feedback: NO_FEEDBACK_YET.to_string(),
            editor_score: 0,
            is_approved: false,
            review_count: 0,
            storyboard_output: String::new(),
        }
    }

    /// Whether at least one review has been recorded.
    pub fn has_been_reviewed(&self) -> bool {
        self.review_count > 0
    }

    /// Feedback handed to the writer: the stored editor feedback followed by
    /// the manager's note for this pass.
    pub fn writer_feedback(&self, manager_notes: &str) -> String {
        format!("{}\nManager Notes: {}", self.editor_feedback, manager_notes)
    }
}

/// Row returned by project listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    /// Project id.
    pub id: i64,
    /// Derived project name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl std::fmt::Display for ProjectSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {} ({})", self.id, self.name, self.created_at)
    }
}

/// Label for a project: the idea itself, or its first
/// [`NAME_MAX_CHARS`] characters followed by `...`.
pub fn project_name(idea: &str) -> String {
    if idea.chars().count() > NAME_MAX_CHARS {
        let prefix: String = idea.chars().take(NAME_MAX_CHARS).collect();
        format!("{prefix}...")
    } else {
        idea.to_string()
    }
}

/// Current local time in the store's timestamp format.
pub fn timestamp_now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
