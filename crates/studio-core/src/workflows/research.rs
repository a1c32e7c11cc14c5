//! Research workflow: idea to brief.

use crate::agents::Crew;
use crate::error::{Result, StudioError};
use crate::state::{Action, Outcome, Session};
use crate::store::{Field, ProjectStore};

/// Runs the research department on the project's idea.
///
/// On success the brief is stored in `research_output` and the session
/// moves to drafting.
///
/// # Errors
///
/// Returns:
/// - `StudioError::IllegalTransition` if the session is not in research
/// - `StudioError::MissingPrerequisite` if the idea is blank
/// - `StudioError::Invocation` if the agent call fails
/// - `StudioError::Database` if the brief cannot be stored
///
/// The session and the store are unchanged on every error.
#[tracing::instrument(skip_all, fields(project = session.project.id))]
pub async fn run_research(
    crew: &Crew,
    store: &dyn ProjectStore,
    session: &mut Session,
) -> Result<String> {
    session.check(Action::Research)?;

    let brief = crew.invoke_research(&session.project.original_idea).await?;
    store.update_field(session.project.id, Field::ResearchOutput, &brief)?;

    session.record_invocation();
    session.apply(Outcome::Researched(brief.clone()));
    Ok(brief)
}

/// Replaces the research brief with hand-edited text.
///
/// Only an existing brief can be edited, and never to blank text, so the
/// derived stage is the same before and after.
///
/// # Errors
///
/// Returns `StudioError::MissingPrerequisite` if there is no brief yet or the
/// new text is blank.
#[tracing::instrument(skip_all, fields(project = session.project.id))]
pub fn edit_research_brief(
    store: &dyn ProjectStore,
    session: &mut Session,
    text: &str,
) -> Result<()> {
    if session.project.research_brief.is_empty() {
        return Err(StudioError::MissingPrerequisite("research brief"));
    }
    if text.trim().is_empty() {
        return Err(StudioError::MissingPrerequisite("brief text"));
    }

    store.update_field(session.project.id, Field::ResearchOutput, text)?;
    session.project.research_brief = text.to_string();

    tracing::info!(chars = text.len(), "research brief edited");
    Ok(())
}
