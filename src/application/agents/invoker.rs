//! Step Invoker - one LLM completion per reasoning step.
//!
//! Thin wrapper over the AiProvider port: builds a single-user-message
//! request with the step's generation parameters and extracts trimmed plain
//! text. A blank completion is a typed failure so callers never mistake it
//! for an answer.

use std::sync::Arc;

use crate::ports::{AiError, AiProvider, CompletionRequest, MessageRole};

/// Generation parameters of one reasoning step.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationParams {
    pub const fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

/// Errors surfaced by a step's LLM call.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    /// The model returned no usable text.
    #[error("model returned no text output")]
    EmptyOutput,

    /// Transport or provider failure.
    #[error("generation request failed: {0}")]
    Upstream(#[from] AiError),
}

/// Invokes the completion endpoint for a reasoning step.
#[derive(Clone)]
pub struct StepInvoker {
    provider: Arc<dyn AiProvider>,
}

impl StepInvoker {
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }

    /// Sends the prompt and returns the trimmed completion text.
    pub async fn invoke(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, InvokeError> {
        let request = CompletionRequest::new()
            .with_message(MessageRole::User, prompt)
            .with_max_tokens(params.max_tokens)
            .with_temperature(params.temperature);

        let response = self.provider.complete(request).await?;

        let text = response.content.trim();
        if text.is_empty() {
            return Err(InvokeError::EmptyOutput);
        }
        Ok(text.to_string())
    }
}
