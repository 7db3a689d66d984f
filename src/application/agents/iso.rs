//! ISO 27001/27002 mapping agent - phase 2, LLM only.

use async_trait::async_trait;
use tracing::warn;

use crate::domain::analysis::{parse_iso_lines, AgentMessage, AnalysisContext, ContextUpdate, StepName};

use super::{GenerationParams, StepAgent, StepInvoker, StepOutcome};

const PARAMS: GenerationParams = GenerationParams::new(400, 0.1);

/// Maps the requirement to ISO/IEC 27001:2022 and 27002:2022 controls.
pub struct IsoAgent {
    invoker: StepInvoker,
}

impl IsoAgent {
    pub fn new(invoker: StepInvoker) -> Self {
        Self { invoker }
    }

    fn prompt(&self, ctx: &AnalysisContext) -> String {
        format!(
            "{preamble}\n\
             TU ES: Agent expert en ISO/IEC 27001:2022 et ISO/IEC 27002:2022\n\n\
             TA MISSION: Identifie les contrôles ISO 27001:2022 et ISO 27002:2022 les plus pertinents.\n\n\
             CRITÈRES:\n\
             - Références précises des normes 2022\n\
             - ISO 27001:2022 format: \"A.X.Y - Titre\"\n\
             - ISO 27002:2022 format: \"X.Y.Z - Titre\"\n\
             - Cohérence avec les autres mappings identifiés\n\n\
             Format de sortie:\n\
             ISO27001: A.X.Y - Titre\n\
             ISO27002: X.Y.Z - Titre\n\
             Justification: [1 phrase]\n\n\
             Réponds UNIQUEMENT avec ce format, sans markdown.",
            preamble = ctx.render_preamble()
        )
    }
}

#[async_trait]
impl StepAgent for IsoAgent {
    fn step(&self) -> StepName {
        StepName::Iso
    }

    async fn execute(&self, ctx: &AnalysisContext) -> StepOutcome {
        match self.invoker.invoke(&self.prompt(ctx), PARAMS).await {
            Ok(text) => {
                let parsed = parse_iso_lines(&text);
                let insight = parsed
                    .iso27001
                    .clone()
                    .map(|m| format!("ISO mappings: {m}"))
                    .unwrap_or_else(|| "Réponse ISO sans mapping exploitable".to_string());

                StepOutcome::success(
                    self.step(),
                    ContextUpdate {
                        iso27001_mapping: parsed.iso27001,
                        iso27002_mapping: parsed.iso27002,
                        ..Default::default()
                    },
                )
                .with_insight(insight)
                .with_message(AgentMessage::context(
                    self.step(),
                    StepName::Cobit,
                    "ISO identifiés",
                ))
            }
            Err(err) => {
                warn!(step = %self.step(), error = %err, "ISO mapping generation failed");
                StepOutcome::failure(self.step(), err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAiProvider;
    use std::sync::Arc;

    fn agent(provider: MockAiProvider) -> IsoAgent {
        IsoAgent::new(StepInvoker::new(Arc::new(provider)))
    }

    #[tokio::test]
    async fn test_parses_both_iso_lines() {
        let agent = agent(MockAiProvider::new().with_response(
            "ISO27001: A.5.15 - Contrôle d'accès\nISO27002: 5.15 - Contrôle d'accès\nJustification: gouvernance des accès",
        ));
        let ctx = AnalysisContext::new("req");

        let outcome = agent.execute(&ctx).await;
        assert!(outcome.success);
        assert_eq!(outcome.update.iso27001_mapping.as_deref(), Some("A.5.15 - Contrôle d'accès"));
        assert_eq!(outcome.update.iso27002_mapping.as_deref(), Some("5.15 - Contrôle d'accès"));
        assert_eq!(outcome.messages[0].to_step, StepName::Cobit);
    }

    #[tokio::test]
    async fn test_missing_lines_leave_fields_unset() {
        // A malformed answer must not put empty strings into the context;
        // assembly falls back to the placeholder instead.
        let agent = agent(MockAiProvider::new().with_response("Aucun contrôle pertinent."));
        let ctx = AnalysisContext::new("req");

        let outcome = agent.execute(&ctx).await;
        assert!(outcome.success);
        assert!(outcome.update.iso27001_mapping.is_none());
        assert!(outcome.update.iso27002_mapping.is_none());
    }
}
