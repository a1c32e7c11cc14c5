//! Context structures for template rendering.

use serde::Serialize;

/// Context data provided to role templates.
///
/// Every role reads a different subset: the researcher reads `idea`, the
/// writer reads `research_brief` and `feedback`, the editor and storyboard
/// artist read `script`.
///
/// # Examples
///
/// ```
/// use studio_pm::PromptContext;
///
/// let context = PromptContext::for_brief("Mars colonies favor...", "Too slow.");
/// assert_eq!(context.feedback.as_deref(), Some("Too slow."));
/// assert!(context.idea.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptContext {
    /// The user's original story idea.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idea: Option<String>,

    /// Research brief produced by the researcher.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_brief: Option<String>,

    /// Editor feedback plus manager notes for the next draft.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,

    /// Current script draft.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

impl PromptContext {
    /// Context for the research role.
    #[must_use]
    pub fn for_idea(idea: impl Into<String>) -> Self {
        Self {
            idea: Some(idea.into()),
            ..Default::default()
        }
    }

    /// Context for the writing role.
    #[must_use]
    pub fn for_brief(brief: impl Into<String>, feedback: impl Into<String>) -> Self {
        Self {
            research_brief: Some(brief.into()),
            feedback: Some(feedback.into()),
            ..Default::default()
        }
    }

    /// Context for the editor and storyboard roles.
    #[must_use]
    pub fn for_script(script: impl Into<String>) -> Self {
        Self {
            script: Some(script.into()),
            ..Default::default()
        }
    }
}
