//! Scripted agent backend for testing.
//!
//! Replies are queued up front and handed out in order; every request is
//! recorded so tests can assert on the prompts the workflows produced.

use crate::agents::backend::{AgentBackend, AgentRequest};
use crate::error::{Result, StudioError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Backend that replays queued responses.
///
/// Clones share the same queue and call log, so a test can keep a handle
/// after boxing one into a [`Crew`](crate::agents::Crew).
///
/// # Examples
///
/// ```
/// use studio_core::agents::scripted_mock::ScriptedBackend;
///
/// let backend = ScriptedBackend::new();
/// backend.push_response("Mars colonies favor...");
/// backend.push_failure("503 Service Unavailable");
/// assert_eq!(backend.pending(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    /// Queued replies; `Err` entries become invocation failures
    responses: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    /// Every request received, in order
    calls: Arc<Mutex<Vec<AgentRequest>>>,
}

impl ScriptedBackend {
    /// Creates a backend with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with the given replies queued.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backend = Self::new();
        for response in responses {
            backend.push_response(response);
        }
        backend
    }

    /// Queues a successful reply.
    pub fn push_response(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .expect("scripted backend lock poisoned")
            .push_back(Ok(text.into()));
    }

    /// Queues a failed call.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .expect("scripted backend lock poisoned")
            .push_back(Err(message.into()));
    }

    /// Number of replies not yet consumed.
    pub fn pending(&self) -> usize {
        self.responses
            .lock()
            .expect("scripted backend lock poisoned")
            .len()
    }

    /// Copy of every request received so far.
    pub fn calls(&self) -> Vec<AgentRequest> {
        self.calls
            .lock()
            .expect("scripted backend lock poisoned")
            .clone()
    }
}

#[async_trait]
impl AgentBackend for ScriptedBackend {
    async fn complete(&self, request: &AgentRequest) -> Result<String> {
        self.calls
            .lock()
            .expect("scripted backend lock poisoned")
            .push(request.clone());

        let next = self
            .responses
            .lock()
            .expect("scripted backend lock poisoned")
            .pop_front();

        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(StudioError::Invocation(message)),
            None => Err(StudioError::Invocation(format!(
                "no scripted response left for {}",
                request.role
            ))),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
