//! Threat analysis agent - phase 3, knowledge-base first with LLM fallback.
//!
//! The catalog lookup returns the threat and, when available, the associated
//! risk in one call. The risk is relayed as a hint so the following step can
//! reuse it without a second lookup.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::analysis::{AgentMessage, AnalysisContext, ContextUpdate, StepName};
use crate::ports::KnowledgeBase;

use super::{GenerationParams, StepAgent, StepInvoker, StepOutcome};

const FALLBACK_PARAMS: GenerationParams = GenerationParams::new(600, 0.15);

/// Identifies the main cyber threat the requirement mitigates.
pub struct ThreatAgent {
    invoker: StepInvoker,
    knowledge_base: Arc<dyn KnowledgeBase>,
}

impl ThreatAgent {
    pub fn new(invoker: StepInvoker, knowledge_base: Arc<dyn KnowledgeBase>) -> Self {
        Self {
            invoker,
            knowledge_base,
        }
    }

    async fn fallback(&self, ctx: &AnalysisContext) -> StepOutcome {
        let prompt = format!(
            "{preamble}\n\
             TU ES: Agent expert en cybersécurité et analyse de menaces (Threat Intelligence)\n\n\
             TA MISSION: Identifie la principale menace cyber que cette exigence cherche à mitiger.\n\n\
             CRITÈRES:\n\
             - Menace technique et précise\n\
             - Référence à des tactiques MITRE ATT&CK si pertinent\n\
             - 2-3 phrases maximum\n\
             - Contexte des frameworks déjà identifiés\n\n\
             Réponds UNIQUEMENT avec la description de la menace, sans préambule ni markdown.",
            preamble = ctx.render_preamble()
        );

        match self.invoker.invoke(&prompt, FALLBACK_PARAMS).await {
            Ok(threat) => StepOutcome::success(
                self.step(),
                ContextUpdate {
                    threat: Some(threat),
                    ..Default::default()
                },
            )
            .with_insight("Menace générée par analyse IA (catalogue SCF non disponible)"),
            Err(err) => {
                warn!(step = %self.step(), error = %err, "threat fallback generation failed");
                StepOutcome::failure(self.step(), err.to_string())
            }
        }
    }
}

#[async_trait]
impl StepAgent for ThreatAgent {
    fn step(&self) -> StepName {
        StepName::Threat
    }

    async fn execute(&self, ctx: &AnalysisContext) -> StepOutcome {
        let lookup = self
            .knowledge_base
            .find_threat_and_risk(&ctx.requirement_text)
            .await;

        let result = match lookup {
            Ok(result) => result,
            Err(err) => {
                warn!(step = %self.step(), error = %err, "threat lookup unavailable, falling back to generation");
                return self.fallback(ctx).await;
            }
        };

        let Some(threat) = result.threat.filter(|t| !t.trim().is_empty()) else {
            debug!(step = %self.step(), "no catalog threat for requirement");
            return self.fallback(ctx).await;
        };

        let risk_hint = result.risk.filter(|r| !r.trim().is_empty());
        let excerpt: String = threat.chars().take(100).collect();

        StepOutcome::success(
            self.step(),
            ContextUpdate {
                threat: Some(threat),
                risk_hint,
                ..Default::default()
            },
        )
        .with_insight("Menace cyber identifiée depuis le catalogue SCF officiel")
        .with_message(AgentMessage::context(
            self.step(),
            StepName::Risk,
            format!("Menace SCF: {excerpt}"),
        ))
    }
}
