//! Implementation guide agent - phase 4, LLM only.

use async_trait::async_trait;
use tracing::warn;

use crate::domain::analysis::{AnalysisContext, ContextUpdate, StepName};

use super::{GenerationParams, StepAgent, StepInvoker, StepOutcome};

const PARAMS: GenerationParams = GenerationParams::new(700, 0.2);

/// Produces a concrete implementation guide for the control.
pub struct ImplementationAgent {
    invoker: StepInvoker,
}

impl ImplementationAgent {
    pub fn new(invoker: StepInvoker) -> Self {
        Self { invoker }
    }

    fn prompt(&self, ctx: &AnalysisContext) -> String {
        format!(
            "{preamble}\n\
             TU ES: Agent expert en implémentation pratique de contrôles de sécurité\n\n\
             TA MISSION: Propose un guide concret d'implémentation de ce contrôle.\n\n\
             CRITÈRES:\n\
             - Étapes concrètes et actionnables\n\
             - Technologies/outils mentionnés si pertinent\n\
             - Bonnes pratiques industrielles\n\
             - 3-4 phrases maximum\n\
             - Cohérent avec les frameworks (SCF, ISO, COBIT) identifiés\n\n\
             Réponds UNIQUEMENT avec le guide d'implémentation, sans préambule ni markdown.",
            preamble = ctx.render_preamble()
        )
    }
}

#[async_trait]
impl StepAgent for ImplementationAgent {
    fn step(&self) -> StepName {
        StepName::Implementation
    }

    async fn execute(&self, ctx: &AnalysisContext) -> StepOutcome {
        match self.invoker.invoke(&self.prompt(ctx), PARAMS).await {
            Ok(text) => StepOutcome::success(
                self.step(),
                ContextUpdate {
                    control_implementation: Some(text),
                    ..Default::default()
                },
            )
            .with_insight("Guide d'implémentation créé"),
            Err(err) => {
                warn!(step = %self.step(), error = %err, "implementation guide generation failed");
                StepOutcome::failure(self.step(), err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAiProvider;
    use crate::domain::analysis::ContextUpdate as Update;
    use std::sync::Arc;

    fn agent(provider: MockAiProvider) -> ImplementationAgent {
        ImplementationAgent::new(StepInvoker::new(Arc::new(provider)))
    }

    #[tokio::test]
    async fn test_stores_guide_verbatim() {
        let guide = "Déployer une solution IAM centralisée. Activer la MFA sur tous les comptes.";
        let agent = agent(MockAiProvider::new().with_response(guide));

        let outcome = agent.execute(&AnalysisContext::new("req")).await;
        assert!(outcome.success);
        assert_eq!(outcome.update.control_implementation.as_deref(), Some(guide));
    }

    #[tokio::test]
    async fn test_prompt_includes_established_mappings() {
        let provider = MockAiProvider::new();
        let agent = agent(provider.clone());
        let mut ctx = AnalysisContext::new("req");
        ctx.apply(Update {
            scf_mapping: Some("IAC-01 - Access Control Governance".to_string()),
            cobit5_mapping: Some("DSS05.04 - Gérer les identités".to_string()),
            ..Default::default()
        });

        agent.execute(&ctx).await;
        let prompt = &provider.prompts()[0];
        assert!(prompt.contains("SCF identifié: IAC-01 - Access Control Governance"));
        assert!(prompt.contains("COBIT 5 identifié: DSS05.04 - Gérer les identités"));
    }
}
