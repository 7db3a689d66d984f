//! Mock AI Provider for testing.
//!
//! Configurable test double for the AiProvider port: queued responses, a
//! prompt-echo mode, error injection and call tracking.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAiProvider::new().with_response("IAC-01 - Access Control Governance");
//! let response = provider.complete(request).await?;
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{AiError, AiProvider, CompletionRequest, CompletionResponse, FinishReason};

const MOCK_MODEL: &str = "mock-model";

/// Mock AI provider for testing.
#[derive(Debug, Clone, Default)]
pub struct MockAiProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<Result<String, MockFailure>>>>,
    /// When set, every call answers with the prompt it received.
    echo_prompt: bool,
    /// Returned once the queue is exhausted (unless echoing).
    default_response: Option<String>,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// Injectable failure modes, mirroring the AiError taxonomy.
#[derive(Debug, Clone)]
pub enum MockFailure {
    RateLimited { retry_after_secs: u32 },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u64 },
    /// The model answered with no text block.
    EmptyContent,
}

impl From<MockFailure> for AiError {
    fn from(failure: MockFailure) -> Self {
        match failure {
            MockFailure::RateLimited { retry_after_secs } => AiError::rate_limited(retry_after_secs),
            MockFailure::Unavailable { message } => AiError::unavailable(message),
            MockFailure::AuthenticationFailed => AiError::AuthenticationFailed,
            MockFailure::Network { message } => AiError::network(message),
            MockFailure::Timeout { timeout_secs } => AiError::Timeout { timeout_secs },
            // EmptyContent is not an AiError: it surfaces as a blank completion
            MockFailure::EmptyContent => unreachable!("EmptyContent handled before conversion"),
        }
    }
}

impl MockAiProvider {
    /// Creates a mock that answers every call with a generic completion.
    pub fn new() -> Self {
        Self {
            default_response: Some("réponse simulée".to_string()),
            ..Default::default()
        }
    }

    /// Queues a successful response.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(content.into()));
        self
    }

    /// Queues a failure.
    pub fn with_failure(self, failure: MockFailure) -> Self {
        self.responses.lock().unwrap().push_back(Err(failure));
        self
    }

    /// Makes every call answer with the prompt it received.
    pub fn with_echo_prompt(mut self) -> Self {
        self.echo_prompt = true;
        self
    }

    /// Recorded requests in call order.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Prompts (first user message) of all recorded requests.
    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.first_user_content().map(ToString::to_string))
            .collect()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AiError> {
        let prompt = request.first_user_content().unwrap_or_default().to_string();
        self.calls.lock().unwrap().push(request);

        let content = if self.echo_prompt {
            prompt
        } else {
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(content)) => content,
                Some(Err(MockFailure::EmptyContent)) => String::new(),
                Some(Err(failure)) => return Err(failure.into()),
                None => self.default_response.clone().unwrap_or_default(),
            }
        };

        Ok(CompletionResponse {
            content,
            model: MOCK_MODEL.to_string(),
            finish_reason: FinishReason::Stop,
        })
    }
}
