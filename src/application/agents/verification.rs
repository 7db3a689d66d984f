//! Verification point agent - phase 1, LLM only.

use async_trait::async_trait;
use tracing::warn;

use crate::domain::analysis::{AnalysisContext, ContextUpdate, StepName};

use super::{GenerationParams, StepAgent, StepInvoker, StepOutcome};

const PARAMS: GenerationParams = GenerationParams::new(500, 0.1);

/// Formulates a concrete, auditable verification point for the requirement.
pub struct VerificationPointAgent {
    invoker: StepInvoker,
}

impl VerificationPointAgent {
    pub fn new(invoker: StepInvoker) -> Self {
        Self { invoker }
    }

    fn prompt(&self, ctx: &AnalysisContext) -> String {
        format!(
            "{preamble}\n\
             TU ES: Agent spécialisé en audit et vérification de conformité\n\n\
             TA MISSION: Formule un point de vérification/contrôle concret et actionnable pour auditer cette exigence.\n\n\
             CRITÈRES:\n\
             - Doit être mesurable et testable\n\
             - Orienté audit pratique\n\
             - 2-3 phrases maximum\n\
             - Format opérationnel\n\n\
             Réponds UNIQUEMENT avec le texte du point de vérification, sans préambule.",
            preamble = ctx.render_preamble()
        )
    }
}

#[async_trait]
impl StepAgent for VerificationPointAgent {
    fn step(&self) -> StepName {
        StepName::VerificationPoint
    }

    async fn execute(&self, ctx: &AnalysisContext) -> StepOutcome {
        match self.invoker.invoke(&self.prompt(ctx), PARAMS).await {
            Ok(text) => StepOutcome::success(
                self.step(),
                ContextUpdate {
                    verification_point: Some(text),
                    ..Default::default()
                },
            )
            .with_insight("Point de vérification opérationnel créé"),
            Err(err) => {
                warn!(step = %self.step(), error = %err, "verification point generation failed");
                StepOutcome::failure(self.step(), err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAiProvider, MockFailure};
    use std::sync::Arc;

    fn agent(provider: MockAiProvider) -> VerificationPointAgent {
        VerificationPointAgent::new(StepInvoker::new(Arc::new(provider)))
    }

    #[tokio::test]
    async fn test_writes_verification_point() {
        let agent = agent(MockAiProvider::new().with_response("Vérifier la revue trimestrielle des accès."));
        let ctx = AnalysisContext::new("Restreindre les accès privilégiés");

        let outcome = agent.execute(&ctx).await;
        assert!(outcome.success);
        assert_eq!(
            outcome.update.verification_point.as_deref(),
            Some("Vérifier la revue trimestrielle des accès.")
        );
    }

    #[tokio::test]
    async fn test_prompt_carries_requirement() {
        let provider = MockAiProvider::new();
        let agent = agent(provider.clone());
        let ctx = AnalysisContext::new("Exiger la MFA");

        agent.execute(&ctx).await;
        assert!(provider.prompts()[0].contains("Exigence analysée: \"Exiger la MFA\""));
    }

    #[tokio::test]
    async fn test_failure_is_self_contained() {
        let agent = agent(MockAiProvider::new().with_failure(MockFailure::Unavailable {
            message: "down".to_string(),
        }));
        let ctx = AnalysisContext::new("req");

        let outcome = agent.execute(&ctx).await;
        assert!(!outcome.success);
        assert!(outcome.update.verification_point.is_none());
        assert!(outcome.error_detail.is_some());
    }
}
