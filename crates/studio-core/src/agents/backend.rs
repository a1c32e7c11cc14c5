//! Agent backend trait.
//!
//! A backend turns one rendered request into one text reply. The real
//! implementation talks HTTP; tests use [`ScriptedBackend`].
//!
//! [`ScriptedBackend`]: crate::agents::scripted_mock::ScriptedBackend

use crate::agents::Role;
use crate::config::AgentMode;
use crate::error::Result;
use async_trait::async_trait;

/// A fully rendered call for one role.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRequest {
    /// Role being invoked.
    pub role: Role,

    /// System prompt for the role.
    pub system: String,

    /// User prompt with the project data rendered in.
    pub prompt: String,

    /// Model settings for the role.
    pub mode: AgentMode,
}

/// Generative-text backend.
///
/// Implementations own retries and timeouts. From the caller's side a call
/// either returns the full reply or fails; it is never partially applied.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Sends the request and waits for the complete reply.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::Invocation` when the service fails, or
    /// `StudioError::SessionUnavailable` when the backend is a degraded
    /// placeholder.
    async fn complete(&self, request: &AgentRequest) -> Result<String>;

    /// Short backend name for logs and the status line.
    fn name(&self) -> &str;
}
