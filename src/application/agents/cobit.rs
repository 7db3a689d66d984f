//! COBIT 5 mapping agent - phase 2, LLM only.
//!
//! When the SCF lookup harvested an adjacent COBIT reference, it is surfaced
//! to the model as an explicit hint section.

use async_trait::async_trait;
use tracing::warn;

use crate::domain::analysis::{marker_line, AgentMessage, AnalysisContext, ContextUpdate, StepName};

use super::{GenerationParams, StepAgent, StepInvoker, StepOutcome};

const PARAMS: GenerationParams = GenerationParams::new(400, 0.1);
const MARKER: &str = "COBIT5:";

/// Maps the requirement to the most relevant COBIT 5 process.
pub struct CobitAgent {
    invoker: StepInvoker,
}

impl CobitAgent {
    pub fn new(invoker: StepInvoker) -> Self {
        Self { invoker }
    }

    fn prompt(&self, ctx: &AnalysisContext) -> String {
        let hint = ctx
            .cobit_hint
            .as_ref()
            .map(|h| format!("INDICE (catalogue SCF): référence COBIT associée au contrôle SCF retenu: {h}\n\n"))
            .unwrap_or_default();

        format!(
            "{preamble}\n\
             {hint}\
             TU ES: Agent expert en COBIT 5 (Control Objectives for Information and Related Technology)\n\n\
             TA MISSION: Identifie le processus/contrôle COBIT 5 le plus pertinent.\n\n\
             CRITÈRES:\n\
             - Référence COBIT 5 complète\n\
             - Format: \"DSSX.YY - Titre du processus\"\n\
             - Aligné avec les domaines COBIT 5 (APO, BAI, DSS, MEA, EDM)\n\
             - Cohérence avec SCF et ISO identifiés\n\n\
             Format de sortie:\n\
             COBIT5: DSSX.YY - Titre\n\
             Justification: [1 phrase]\n\n\
             Réponds UNIQUEMENT avec ce format, sans markdown.",
            preamble = ctx.render_preamble()
        )
    }
}

#[async_trait]
impl StepAgent for CobitAgent {
    fn step(&self) -> StepName {
        StepName::Cobit
    }

    async fn execute(&self, ctx: &AnalysisContext) -> StepOutcome {
        match self.invoker.invoke(&self.prompt(ctx), PARAMS).await {
            Ok(text) => {
                let mapping = marker_line(&text, MARKER);
                let insight = mapping
                    .clone()
                    .map(|m| format!("COBIT identifié: {m}"))
                    .unwrap_or_else(|| "Réponse COBIT sans mapping exploitable".to_string());

                StepOutcome::success(
                    self.step(),
                    ContextUpdate {
                        cobit5_mapping: mapping,
                        ..Default::default()
                    },
                )
                .with_insight(insight)
                .with_message(AgentMessage::context(
                    self.step(),
                    StepName::Threat,
                    "Frameworks mappés, analyse de menaces possible",
                ))
            }
            Err(err) => {
                warn!(step = %self.step(), error = %err, "COBIT mapping generation failed");
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

    fn agent(provider: MockAiProvider) -> CobitAgent {
        CobitAgent::new(StepInvoker::new(Arc::new(provider)))
    }

    #[tokio::test]
    async fn test_extracts_marker_line() {
        let agent = agent(MockAiProvider::new().with_response(
            "COBIT5: DSS05.04 - Gérer les identités des utilisateurs et les accès logiques\nJustification: accès",
        ));
        let ctx = AnalysisContext::new("req");

        let outcome = agent.execute(&ctx).await;
        assert_eq!(
            outcome.update.cobit5_mapping.as_deref(),
            Some("DSS05.04 - Gérer les identités des utilisateurs et les accès logiques")
        );
        assert_eq!(outcome.messages[0].to_step, StepName::Threat);
    }

    #[tokio::test]
    async fn test_hint_is_included_when_present() {
        let provider = MockAiProvider::new();
        let agent = agent(provider.clone());
        let mut ctx = AnalysisContext::new("req");
        ctx.apply(Update {
            cobit_hint: Some("DSS05.04".to_string()),
            ..Default::default()
        });

        agent.execute(&ctx).await;
        assert!(provider.prompts()[0].contains("INDICE (catalogue SCF)"));
        assert!(provider.prompts()[0].contains("DSS05.04"));
    }

    #[tokio::test]
    async fn test_no_hint_section_without_hint() {
        let provider = MockAiProvider::new();
        let agent = agent(provider.clone());
        let ctx = AnalysisContext::new("req");

        agent.execute(&ctx).await;
        assert!(!provider.prompts()[0].contains("INDICE (catalogue SCF)"));
    }
}
