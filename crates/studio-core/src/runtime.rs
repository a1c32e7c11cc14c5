//! Runtime for studio workflows.
//!
//! [`Studio`] owns the configuration, the project store and the agent crew,
//! and hands them to the `workflows` functions. It holds no session state:
//! callers open a [`Session`] per project and pass it back in.

use crate::agents::http_impl::AnthropicBackend;
use crate::agents::unavailable::UnavailableBackend;
use crate::agents::{AgentBackend, Crew};
use crate::config::StudioConfig;
use crate::error::{Result, StudioError};
use crate::project::ProjectSummary;
use crate::review::ReviewVerdict;
use crate::state::Session;
use crate::store::ProjectStore;
use crate::store::sqlite_impl::SqliteStore;
use crate::workflows;
use std::path::{Path, PathBuf};
use studio_pm::PromptManager;

/// Studio runtime.
///
/// # Examples
///
/// ```no_run
/// use studio_core::{Studio, StudioConfig};
/// use std::path::PathBuf;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StudioConfig::load(PathBuf::from("/films"))?;
/// let studio = Studio::new(config)?;
///
/// let mut session = studio.start_project("A robot chef on Mars")?;
/// studio.run_research(&mut session).await?;
/// studio.write_script(&mut session, "keep it short").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Studio {
    /// Studio configuration.
    pub config: StudioConfig,

    store: Box<dyn ProjectStore>,
    crew: Crew,
    init_warning: Option<String>,
}

impl Studio {
    /// Creates the runtime: opens the database under the state directory,
    /// loads prompts and connects the agent backend.
    ///
    /// A backend that cannot be built (usually a missing API key) does not
    /// fail construction. The studio falls back to a placeholder backend and
    /// reports the reason through [`Studio::init_warning`].
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the prompt
    /// templates fail to load.
    pub fn new(config: StudioConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.state_dir)?;
        let store = SqliteStore::open(&config.db_path)?;

        let mut init_warning = None;
        let backend: Box<dyn AgentBackend> =
            match AnthropicBackend::new(&config.agent, config.retry.clone()) {
                Ok(backend) => Box::new(backend),
                Err(err) => {
                    tracing::warn!(error = %err, "running without an agent backend");
                    let reason = match err {
                        StudioError::SessionUnavailable(reason) => reason,
                        other => other.to_string(),
                    };
                    init_warning = Some(reason.clone());
                    Box::new(UnavailableBackend::new(reason))
                }
            };

        let mut studio = Self::with_parts(config, Box::new(store), backend)?;
        studio.init_warning = init_warning;
        Ok(studio)
    }

    /// Creates the runtime from an explicit store and backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt templates fail to load.
    pub fn with_parts(
        config: StudioConfig,
        store: Box<dyn ProjectStore>,
        backend: Box<dyn AgentBackend>,
    ) -> Result<Self> {
        let prompts = Self::init_prompt_manager(&config)?;
        let crew = Crew::new(backend, prompts, config.roles.clone());
        tracing::debug!(backend = crew.backend_name(), "studio ready");

        Ok(Self {
            config,
            store,
            crew,
            init_warning: None,
        })
    }

    /// Loads prompts, letting the first existing override directory shadow
    /// the bundled templates.
    fn init_prompt_manager(config: &StudioConfig) -> Result<PromptManager> {
        for dir in &config.prompt_dirs {
            if dir.is_dir() {
                tracing::debug!(dir = %dir.display(), "using prompt overrides");
                return Ok(PromptManager::with_overrides(dir.clone())?);
            }
            tracing::warn!(dir = %dir.display(), "prompt directory not found, skipping");
        }
        Ok(PromptManager::bundled()?)
    }

    /// Why the agent backend is degraded, if it is.
    pub fn init_warning(&self) -> Option<&str> {
        self.init_warning.as_deref()
    }

    /// Name of the agent backend in use.
    pub fn backend_name(&self) -> &str {
        self.crew.backend_name()
    }

    /// Names of the prompt templates in use.
    pub fn prompt_templates(&self) -> Result<Vec<String>> {
        self.crew.template_names()
    }

    /// Creates a project from an idea and opens it in research.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::MissingPrerequisite` for a blank idea.
    #[tracing::instrument(skip_all)]
    pub fn start_project(&self, idea: &str) -> Result<Session> {
        if idea.trim().is_empty() {
            return Err(StudioError::MissingPrerequisite("idea"));
        }
        let id = self.store.create(idea)?;
        tracing::info!(project = id, "project created");
        self.open_project(id)
    }

    /// Loads a project and opens a session on its derived stage.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::ProjectNotFound` for an unknown id.
    pub fn open_project(&self, id: i64) -> Result<Session> {
        let project = self
            .store
            .load(id)?
            .ok_or(StudioError::ProjectNotFound(id))?;
        Ok(Session::open(project))
    }

    /// Lists all projects, newest first.
    pub fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        self.store.list_all()
    }

    /// Runs the research stage.
    pub async fn run_research(&self, session: &mut Session) -> Result<String> {
        workflows::run_research(&self.crew, self.store.as_ref(), session).await
    }

    /// Runs the writing stage with the manager's notes.
    pub async fn write_script(&self, session: &mut Session, manager_notes: &str) -> Result<String> {
        workflows::write_script(&self.crew, self.store.as_ref(), session, manager_notes).await
    }

    /// Runs the editorial review.
    pub async fn run_review(&self, session: &mut Session) -> Result<ReviewVerdict> {
        workflows::run_review(&self.crew, self.store.as_ref(), session).await
    }

    /// Sends an unapproved script back to the writer.
    pub fn send_back(&self, session: &mut Session) -> Result<()> {
        workflows::send_back(session)
    }

    /// Generates storyboards for the script.
    pub async fn generate_storyboard(&self, session: &mut Session) -> Result<String> {
        workflows::generate_storyboard(&self.crew, self.store.as_ref(), session).await
    }

    /// Writes the script to `path`, or to the configured export file.
    ///
    /// # Returns
    ///
    /// The path that was written.
    pub fn export_script(&self, session: &Session, path: Option<&Path>) -> Result<PathBuf> {
        let path = path.unwrap_or(&self.config.export_file).to_path_buf();
        workflows::export_script(session, &path)?;
        Ok(path)
    }

    /// Replaces the research brief with edited text.
    pub fn edit_research_brief(&self, session: &mut Session, text: &str) -> Result<()> {
        workflows::edit_research_brief(self.store.as_ref(), session, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::scripted_mock::ScriptedBackend;
    use crate::state::Stage;
    use crate::store::memory_mock::MemoryStore;
    use studio_pm::{PromptContext, PromptEngine};
    use tempfile::TempDir;

    fn studio(backend: &ScriptedBackend) -> (Studio, MemoryStore) {
        let store = MemoryStore::new();
        let studio = Studio::with_parts(
            StudioConfig::new(PathBuf::from("/films")),
            Box::new(store.clone()),
            Box::new(backend.clone()),
        )
        .unwrap();
        (studio, store)
    }

    #[test]
    fn test_start_project_rejects_blank_idea() {
        let (studio, store) = studio(&ScriptedBackend::new());
        assert!(matches!(
            studio.start_project("  "),
            Err(StudioError::MissingPrerequisite("idea"))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_start_project_opens_in_research() {
        let (studio, _) = studio(&ScriptedBackend::new());
        let session = studio.start_project("A robot chef on Mars").unwrap();
        assert_eq!(session.stage, Stage::Research);
        assert_eq!(studio.list_projects().unwrap().len(), 1);
    }

    #[test]
    fn test_open_unknown_project() {
        let (studio, _) = studio(&ScriptedBackend::new());
        assert!(matches!(
            studio.open_project(99),
            Err(StudioError::ProjectNotFound(99))
        ));
    }

    #[test]
    fn test_new_without_key_runs_degraded() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = StudioConfig::new(temp_dir.path().to_path_buf());
        config.agent.api_key_env = "STUDIO_TEST_KEY_THAT_IS_NEVER_SET".into();

        let studio = Studio::new(config).unwrap();
        assert!(studio.init_warning().unwrap().contains("STUDIO_TEST_KEY_THAT_IS_NEVER_SET"));
        assert_eq!(studio.backend_name(), "unavailable");
        assert!(temp_dir.path().join(".studio").join("studio.db").exists());
    }

    #[tokio::test]
    async fn test_degraded_studio_reports_session_error_without_mutation() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = StudioConfig::new(temp_dir.path().to_path_buf());
        config.agent.api_key_env = "STUDIO_TEST_KEY_THAT_IS_NEVER_SET".into();
        let studio = Studio::new(config).unwrap();

        let mut session = studio.start_project("idea").unwrap();
        let err = studio.run_research(&mut session).await.unwrap_err();
        assert!(matches!(err, StudioError::SessionUnavailable(_)));
        assert_eq!(session.stage, Stage::Research);
    }

    #[test]
    fn test_prompt_override_directory_is_used() {
        let temp_dir = TempDir::new().unwrap();
        let prompts = temp_dir.path().join("prompts");
        std::fs::create_dir_all(&prompts).unwrap();
        std::fs::write(prompts.join("researcher.j2"), "Research: {{ idea }}").unwrap();

        let mut config = StudioConfig::new(temp_dir.path().to_path_buf());
        config.prompt_dirs = vec![temp_dir.path().join("missing"), prompts];
        let pm = Studio::init_prompt_manager(&config).unwrap();

        let text = pm
            .render("researcher", &PromptContext::for_idea("robots"))
            .unwrap();
        assert_eq!(text, "Research: robots");
        // Templates without an override still come from the bundle
        assert!(pm.get_system_prompt("editor").is_ok());
    }
}
