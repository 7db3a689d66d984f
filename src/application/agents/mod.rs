//! Step agents - the eight specialized analysis units.
//!
//! Each agent reads the shared context (via the rendered preamble), optionally
//! consults the knowledge base, optionally falls back to LLM generation, and
//! returns a [`StepOutcome`] describing what it discovered. Agents never
//! mutate the context and never let a lookup or generation failure escape
//! their boundary: a failed step yields `success: false` and an empty update,
//! and the orchestrator carries on with whatever was established so far.

mod cobit;
mod implementation;
mod invoker;
mod iso;
mod risk;
mod scf;
mod synthesizer;
mod threat;
mod verification;

pub use cobit::CobitAgent;
pub use implementation::ImplementationAgent;
pub use invoker::{GenerationParams, InvokeError, StepInvoker};
pub use iso::IsoAgent;
pub use risk::RiskAgent;
pub use scf::ScfAgent;
pub use synthesizer::SynthesizerAgent;
pub use threat::ThreatAgent;
pub use verification::VerificationPointAgent;

use async_trait::async_trait;

use crate::domain::analysis::{AgentMessage, AnalysisContext, ContextUpdate, StepName};

/// Result of one step agent execution.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub step: StepName,
    pub success: bool,
    /// Context fields discovered by this step; merged by the orchestrator.
    pub update: ContextUpdate,
    /// Free-text insight recorded under the agent's label.
    pub insight: Option<String>,
    /// Failure detail when `success` is false.
    pub error_detail: Option<String>,
    /// Notifications emitted towards other steps.
    pub messages: Vec<AgentMessage>,
}

impl StepOutcome {
    /// A successful outcome carrying the discovered fields.
    pub fn success(step: StepName, update: ContextUpdate) -> Self {
        Self {
            step,
            success: true,
            update,
            insight: None,
            error_detail: None,
            messages: Vec::new(),
        }
    }

    /// A self-contained failure: empty update, detail recorded.
    pub fn failure(step: StepName, detail: impl Into<String>) -> Self {
        Self {
            step,
            success: false,
            update: ContextUpdate::default(),
            insight: None,
            error_detail: Some(detail.into()),
            messages: Vec::new(),
        }
    }

    pub fn with_insight(mut self, insight: impl Into<String>) -> Self {
        self.insight = Some(insight.into());
        self
    }

    pub fn with_message(mut self, message: AgentMessage) -> Self {
        self.messages.push(message);
        self
    }
}

/// Port-like seam for the eight analysis steps.
#[async_trait]
pub trait StepAgent: Send + Sync {
    /// Which step this agent implements.
    fn step(&self) -> StepName;

    /// Runs the step against a snapshot of the shared context.
    async fn execute(&self, ctx: &AnalysisContext) -> StepOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_outcome_shape() {
        let outcome = StepOutcome::success(StepName::Iso, ContextUpdate::default())
            .with_insight("mappings ISO posés")
            .with_message(AgentMessage::context(StepName::Iso, StepName::Cobit, "ISO identifiés"));

        assert!(outcome.success);
        assert!(outcome.error_detail.is_none());
        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(outcome.insight.as_deref(), Some("mappings ISO posés"));
    }

    #[test]
    fn test_failure_outcome_has_empty_update() {
        let outcome = StepOutcome::failure(StepName::Scf, "generation failed");

        assert!(!outcome.success);
        assert!(outcome.update.scf_mapping.is_none());
        assert_eq!(outcome.error_detail.as_deref(), Some("generation failed"));
    }
}
