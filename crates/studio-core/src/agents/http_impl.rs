//! HTTP agent backend for the Anthropic Messages API.

use crate::agents::backend::{AgentBackend, AgentRequest};
use crate::config::{AgentConfig, RetryPolicy};
use crate::error::{Result, StudioError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const API_VERSION: &str = "2023-06-01";

/// Messages API backend with exponential-backoff retries.
pub struct AnthropicBackend {
    client: Client,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for AnthropicBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicBackend")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl AnthropicBackend {
    /// Builds the backend, reading the API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::SessionUnavailable`] if the key is missing or
    /// the HTTP client cannot be built.
    pub fn new(agent: &AgentConfig, retry: RetryPolicy) -> Result<Self> {
        let api_key = agent.api_key()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(agent.timeout_secs))
            .build()
            .map_err(|e| StudioError::SessionUnavailable(format!("http client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: agent.base_url.clone(),
            retry,
        })
    }

    async fn send_once(&self, body: &MessagesRequest<'_>) -> std::result::Result<String, CallError> {
        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() || e.is_request() {
                    CallError::Retryable(e.to_string())
                } else {
                    CallError::Fatal(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = format!("API error ({status}): {text}");
            return Err(if is_retryable_status(status) {
                CallError::Retryable(message)
            } else {
                CallError::Fatal(message)
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| CallError::Fatal(format!("unreadable response body: {e}")))?;
        Ok(parsed.text())
    }
}

#[async_trait]
impl AgentBackend for AnthropicBackend {
    #[tracing::instrument(skip_all, fields(role = %request.role, model = %request.mode.model))]
    async fn complete(&self, request: &AgentRequest) -> Result<String> {
        let body = MessagesRequest::from_request(request);
        let started = Instant::now();
        let mut attempt = 0u32;

        loop {
            match self.send_once(&body).await {
                Ok(text) => {
                    tracing::debug!(attempts = attempt + 1, chars = text.len(), "agent replied");
                    return Ok(text);
                }
                Err(CallError::Fatal(message)) => return Err(StudioError::Invocation(message)),
                Err(CallError::Retryable(message)) => {
                    let delay = self.retry.backoff(attempt);
                    if started.elapsed() + delay > self.retry.deadline() {
                        return Err(StudioError::Invocation(format!(
                            "{message} (gave up after {} attempts)",
                            attempt + 1
                        )));
                    }
                    tracing::warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "agent call failed, retrying: {message}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

/// Failure of a single HTTP attempt.
#[derive(Debug)]
enum CallError {
    /// Worth another attempt (transport trouble, 429, 5xx).
    Retryable(String),
    /// Retrying will not help (auth, bad request, unreadable body).
    Fatal(String),
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

/// Messages API request body.
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

impl<'a> MessagesRequest<'a> {
    fn from_request(request: &'a AgentRequest) -> Self {
        Self {
            model: &request.mode.model,
            max_tokens: request.mode.max_tokens,
            temperature: request.mode.temperature,
            system: &request.system,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        }
    }
}

/// Message in a request.
#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Messages API response body.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

impl MessagesResponse {
    /// Concatenated text of all text blocks.
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Content block in a response.
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Role;
    use crate::config::AgentMode;

    #[test]
    fn test_request_body_shape() {
        let request = AgentRequest {
            role: Role::Editor,
            system: "You are an editor.".into(),
            prompt: "Review this.".into(),
            mode: AgentMode {
                model: "claude-test".into(),
                temperature: 0.5,
                max_tokens: 512,
            },
        };

        let body = serde_json::to_value(MessagesRequest::from_request(&request)).unwrap();
        assert_eq!(body["model"], "claude-test");
        assert_eq!(body["max_tokens"], 512);
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["system"], "You are an editor.");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Review this.");
    }

    #[test]
    fn test_response_text_joins_text_blocks() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"INT. "},{"type":"tool_use","id":"x"},{"type":"text","text":"KITCHEN"}]}"#,
        )
        .unwrap();
        assert_eq!(response.text(), "INT. KITCHEN");
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_new_fails_without_key() {
        let agent = AgentConfig {
            api_key_env: "STUDIO_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..AgentConfig::default()
        };
        assert!(matches!(
            AnthropicBackend::new(&agent, RetryPolicy::default()),
            Err(StudioError::SessionUnavailable(_))
        ));
    }
}
