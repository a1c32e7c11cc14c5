//! Script export.

use crate::error::{Result, StudioError};
use crate::state::Session;
use anyhow::Context;
use std::path::Path;

/// Writes the raw script text to `path`.
///
/// Parent directories are created as needed. The session is not modified.
///
/// # Errors
///
/// Returns `StudioError::MissingPrerequisite` if there is no script, or an
/// error if the file cannot be written.
#[tracing::instrument(skip(session), fields(project = session.project.id, path = %path.display()))]
pub fn export_script(session: &Session, path: &Path) -> Result<()> {
    let script = &session.project.script_content;
    if script.is_empty() {
        return Err(StudioError::MissingPrerequisite("script"));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context("failed to create export directory")?;
    }
    std::fs::write(path, script).context("failed to write exported script")?;

    tracing::info!(bytes = script.len(), "script exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EXPORT_FILE_NAME;
    use crate::project::Project;
    use tempfile::TempDir;

    #[test]
    fn test_export_writes_raw_script() {
        let temp_dir = TempDir::new().unwrap();
        let mut project = Project::draft(1, "idea", "now");
        project.research_brief = "brief".into();
        project.script_content = "INT. KITCHEN - NIGHT\n\nA robot stirs soup.".into();
        let session = Session::open(project);

        let path = temp_dir.path().join("out").join(EXPORT_FILE_NAME);
        export_script(&session, &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "INT. KITCHEN - NIGHT\n\nA robot stirs soup."
        );
    }

    #[test]
    fn test_export_without_script_is_warning() {
        let temp_dir = TempDir::new().unwrap();
        let session = Session::open(Project::draft(1, "idea", "now"));

        let path = temp_dir.path().join(EXPORT_FILE_NAME);
        let err = export_script(&session, &path).unwrap_err();
        assert!(err.is_warning());
        assert!(!path.exists());
    }
}
