//! Placeholder backend used when the real one could not be set up.

use crate::agents::backend::{AgentBackend, AgentRequest};
use crate::error::{Result, StudioError};
use async_trait::async_trait;

/// Backend that fails every call with the reason initialization failed.
///
/// Lets the studio keep running, browsing and exporting projects, while the
/// agents are out of reach.
#[derive(Debug, Clone)]
pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    /// Creates a placeholder carrying the initialization failure.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Why the real backend is missing.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[async_trait]
impl AgentBackend for UnavailableBackend {
    async fn complete(&self, request: &AgentRequest) -> Result<String> {
        tracing::warn!(role = %request.role, "agent call refused: {}", self.reason);
        Err(StudioError::SessionUnavailable(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}
