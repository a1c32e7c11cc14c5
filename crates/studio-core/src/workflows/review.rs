//! Editorial review workflow and the send-back loop.

use crate::agents::Crew;
use crate::error::{Result, StudioError};
use crate::review::ReviewVerdict;
use crate::state::{Action, Outcome, Session};
use crate::store::ProjectStore;

/// Runs the editor's desk on the current script.
///
/// A parsed verdict is stored in one write (feedback, score, approval and
/// the review counter). An approved verdict moves the session to production;
/// otherwise it stays in review and send-back becomes available.
///
/// # Errors
///
/// Returns:
/// - `StudioError::IllegalTransition` if the session is not in review
/// - `StudioError::MissingPrerequisite` if there is no script
/// - `StudioError::Invocation` if the agent call fails
/// - `StudioError::MalformedReview` if the verdict cannot be parsed; the
///   previous feedback, score and approval are kept
#[tracing::instrument(skip_all, fields(project = session.project.id))]
pub async fn run_review(
    crew: &Crew,
    store: &dyn ProjectStore,
    session: &mut Session,
) -> Result<ReviewVerdict> {
    session.check(Action::Review)?;

    let verdict = match crew.invoke_review(&session.project.script_content).await {
        Ok(verdict) => verdict,
        Err(err @ StudioError::MalformedReview { .. }) => {
            tracing::warn!(error = %err, "editor reply could not be parsed");
            return Err(err);
        }
        Err(err) => return Err(err),
    };

    store.update_review_stats(
        session.project.id,
        &verdict.critique,
        verdict.score,
        verdict.approved,
    )?;

    tracing::info!(
        score = verdict.score,
        approved = verdict.approved,
        "review recorded"
    );
    session.record_invocation();
    session.apply(Outcome::Reviewed(verdict.clone()));
    Ok(verdict)
}

/// Returns a reviewed, unapproved script to the writer.
///
/// Nothing is written to the store: the brief and the feedback stay as they
/// are so the next writing pass can consume them. The move only lives in the
/// session; reopening the project lands on review again.
///
/// # Errors
///
/// Returns `StudioError::IllegalTransition` if the session is not in review,
/// no review has been recorded yet, or the script is already approved.
#[tracing::instrument(skip_all, fields(project = session.project.id))]
pub fn send_back(session: &mut Session) -> Result<()> {
    session.check(Action::SendBack)?;
    session.apply(Outcome::SentBack);
    Ok(())
}
