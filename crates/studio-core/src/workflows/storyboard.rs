//! Production workflow: approved script to storyboards.

use crate::agents::Crew;
use crate::error::Result;
use crate::state::{Action, Outcome, Session};
use crate::store::{Field, ProjectStore};

/// Runs the art department on the current script.
///
/// Each run overwrites `storyboard_output`; the session stays in production.
///
/// # Errors
///
/// Returns:
/// - `StudioError::IllegalTransition` if the session is not in production
/// - `StudioError::MissingPrerequisite` if there is no script
/// - `StudioError::Invocation` if the agent call fails
#[tracing::instrument(skip_all, fields(project = session.project.id))]
pub async fn generate_storyboard(
    crew: &Crew,
    store: &dyn ProjectStore,
    session: &mut Session,
) -> Result<String> {
    session.check(Action::Storyboard)?;

    let markdown = crew
        .invoke_storyboard(&session.project.script_content)
        .await?;
    store.update_field(session.project.id, Field::StoryboardOutput, &markdown)?;

    session.record_invocation();
    session.apply(Outcome::Storyboarded(markdown.clone()));
    Ok(markdown)
}
