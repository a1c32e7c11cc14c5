//! Agent invocation facade.
//!
//! [`Crew`] is the only thing workflows talk to. It renders the role prompt,
//! calls an [`AgentBackend`] once and turns the reply into a typed value.
//! Retries, timeouts and transport details belong to the backend.

pub mod backend;
pub mod http_impl;
pub mod panels;
pub mod scripted_mock;
pub mod unavailable;

pub use backend::{AgentBackend, AgentRequest};

use crate::config::RoleModes;
use crate::error::{Result, StudioError};
use crate::review::ReviewVerdict;
use std::fmt;
use studio_pm::{PromptContext, PromptEngine, PromptManager};

/// The four departments of the studio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Turns an idea into a research brief.
    Researcher,
    /// Turns a brief and feedback into a screenplay.
    Writer,
    /// Scores and approves or critiques a screenplay.
    Editor,
    /// Turns an approved screenplay into storyboard markdown.
    Storyboard,
}

impl Role {
    /// All roles, in pipeline order.
    pub const ALL: [Role; 4] = [Role::Researcher, Role::Writer, Role::Editor, Role::Storyboard];

    /// Template and config key for the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Researcher => "researcher",
            Role::Writer => "writer",
            Role::Editor => "editor",
            Role::Storyboard => "storyboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facade over the agent backend, one method per role.
pub struct Crew {
    backend: Box<dyn AgentBackend>,
    prompts: PromptManager,
    modes: RoleModes,
}

impl fmt::Debug for Crew {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crew")
            .field("backend", &self.backend.name())
            .field("prompts", &self.prompts.templates_dir)
            .finish()
    }
}

impl Crew {
    /// Creates a crew from a backend, a prompt manager and per-role settings.
    pub fn new(backend: Box<dyn AgentBackend>, prompts: PromptManager, modes: RoleModes) -> Self {
        Self {
            backend,
            prompts,
            modes,
        }
    }

    /// Name of the backend in use.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Names of the prompt templates the crew can render.
    pub fn template_names(&self) -> Result<Vec<String>> {
        Ok(self.prompts.list_templates()?)
    }

    /// Asks the researcher for a brief on `idea`.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Invocation`] if the call fails or returns
    /// nothing.
    pub async fn invoke_research(&self, idea: &str) -> Result<String> {
        self.call(Role::Researcher, &PromptContext::for_idea(idea))
            .await
    }

    /// Asks the writer for a screenplay.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Invocation`] if the call fails or returns
    /// nothing.
    pub async fn invoke_writing(&self, brief: &str, feedback: &str) -> Result<String> {
        self.call(Role::Writer, &PromptContext::for_brief(brief, feedback))
            .await
    }

    /// Asks the editor for a verdict on `script`.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Invocation`] if the call fails and
    /// [`StudioError::MalformedReview`] if the reply cannot be parsed.
    pub async fn invoke_review(&self, script: &str) -> Result<ReviewVerdict> {
        let raw = self
            .call(Role::Editor, &PromptContext::for_script(script))
            .await?;
        ReviewVerdict::parse(&raw)
    }

    /// Asks the storyboard artist for markdown, with panel lines expanded
    /// into placeholder images.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Invocation`] if the call fails or returns
    /// nothing.
    pub async fn invoke_storyboard(&self, script: &str) -> Result<String> {
        let markdown = self
            .call(Role::Storyboard, &PromptContext::for_script(script))
            .await?;
        Ok(panels::expand_panels(&markdown))
    }

    async fn call(&self, role: Role, context: &PromptContext) -> Result<String> {
        let request = AgentRequest {
            role,
            system: self.prompts.get_system_prompt(role.as_str())?,
            prompt: self.prompts.render(role.as_str(), context)?,
            mode: self.modes.for_role(role).clone(),
        };

        tracing::debug!(
            role = %role,
            backend = self.backend.name(),
            prompt_len = request.prompt.len(),
            "invoking agent"
        );

        let text = self.backend.complete(&request).await?;
        if text.trim().is_empty() {
            return Err(StudioError::Invocation(format!(
                "{role} returned an empty response"
            )));
        }
        Ok(text)
    }
}
