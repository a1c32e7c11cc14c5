//! Writing workflow: brief and feedback to script.

use crate::agents::Crew;
use crate::error::Result;
use crate::state::{Action, Outcome, Session};
use crate::store::{Field, ProjectStore};

/// Runs the writer's room on the research brief.
///
/// The writer receives the stored editor feedback followed by
/// `manager_notes`. The new draft overwrites `script_content`; no history is
/// kept.
///
/// # Errors
///
/// Returns:
/// - `StudioError::IllegalTransition` if the session is not in drafting
/// - `StudioError::MissingPrerequisite` if there is no brief
/// - `StudioError::Invocation` if the agent call fails
/// - `StudioError::Database` if the script cannot be stored
#[tracing::instrument(skip_all, fields(project = session.project.id, notes = !manager_notes.is_empty()))]
pub async fn write_script(
    crew: &Crew,
    store: &dyn ProjectStore,
    session: &mut Session,
    manager_notes: &str,
) -> Result<String> {
    session.check(Action::Write)?;

    let feedback = session.project.writer_feedback(manager_notes);
    let script = crew
        .invoke_writing(&session.project.research_brief, &feedback)
        .await?;
    store.update_field(session.project.id, Field::ScriptContent, &script)?;

    session.record_invocation();
    session.apply(Outcome::Drafted(script.clone()));
    Ok(script)
}
