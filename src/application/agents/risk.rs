//! Risk analysis agent - phase 3, runs after the threat step.
//!
//! Lookup order: the risk hint relayed by the threat step (no extra call),
//! then the catalog, then LLM generation.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::analysis::{AgentMessage, AnalysisContext, ContextUpdate, StepName};
use crate::ports::KnowledgeBase;

use super::{GenerationParams, StepAgent, StepInvoker, StepOutcome};

const FALLBACK_PARAMS: GenerationParams = GenerationParams::new(600, 0.15);

/// Describes the business and cyber risk of not meeting the requirement.
pub struct RiskAgent {
    invoker: StepInvoker,
    knowledge_base: Arc<dyn KnowledgeBase>,
}

impl RiskAgent {
    pub fn new(invoker: StepInvoker, knowledge_base: Arc<dyn KnowledgeBase>) -> Self {
        Self {
            invoker,
            knowledge_base,
        }
    }

    fn from_catalog(&self, risk: String) -> StepOutcome {
        StepOutcome::success(
            self.step(),
            ContextUpdate {
                risk: Some(risk),
                ..Default::default()
            },
        )
        .with_insight("Risque identifié depuis le catalogue SCF")
        .with_message(AgentMessage::context(
            self.step(),
            StepName::Implementation,
            "Risques identifiés, implémentation requise",
        ))
    }

    async fn fallback(&self, ctx: &AnalysisContext) -> StepOutcome {
        let prompt = format!(
            "{preamble}\n\
             TU ES: Agent expert en gestion des risques cyber (Risk Management)\n\n\
             TA MISSION: Décris le risque métier/cyber si cette exigence N'EST PAS respectée.\n\n\
             CRITÈRES:\n\
             - Impact métier concret\n\
             - Probabilité et gravité\n\
             - Conséquences techniques et business\n\
             - 2-3 phrases maximum\n\
             - Lié à la menace identifiée\n\n\
             Réponds UNIQUEMENT avec la description du risque, sans préambule ni markdown.",
            preamble = ctx.render_preamble()
        );

        match self.invoker.invoke(&prompt, FALLBACK_PARAMS).await {
            Ok(risk) => StepOutcome::success(
                self.step(),
                ContextUpdate {
                    risk: Some(risk),
                    ..Default::default()
                },
            )
            .with_insight("Risque généré par analyse IA (catalogue SCF non disponible)"),
            Err(err) => {
                warn!(step = %self.step(), error = %err, "risk fallback generation failed");
                StepOutcome::failure(self.step(), err.to_string())
            }
        }
    }
}

#[async_trait]
impl StepAgent for RiskAgent {
    fn step(&self) -> StepName {
        StepName::Risk
    }

    async fn execute(&self, ctx: &AnalysisContext) -> StepOutcome {
        if let Some(hint) = ctx.risk_hint.as_ref().filter(|h| !h.trim().is_empty()) {
            debug!(step = %self.step(), "reusing risk relayed by the threat step");
            return self
                .from_catalog(hint.clone())
                .with_insight("Risque business/cyber identifié depuis le catalogue SCF officiel");
        }

        let lookup = self
            .knowledge_base
            .find_threat_and_risk(&ctx.requirement_text)
            .await;

        match lookup {
            Ok(result) => match result.risk.filter(|r| !r.trim().is_empty()) {
                Some(risk) => self.from_catalog(risk),
                None => {
                    debug!(step = %self.step(), "no catalog risk for requirement");
                    self.fallback(ctx).await
                }
            },
            Err(err) => {
                warn!(step = %self.step(), error = %err, "risk lookup unavailable, falling back to generation");
                self.fallback(ctx).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAiProvider;
    use crate::adapters::knowledge_base::MockKnowledgeBase;
    use crate::ports::{KnowledgeBaseError, ThreatRisk};

    fn agent(provider: &MockAiProvider, kb: &MockKnowledgeBase) -> RiskAgent {
        RiskAgent::new(
            StepInvoker::new(Arc::new(provider.clone())),
            Arc::new(kb.clone()),
        )
    }

    #[tokio::test]
    async fn test_hint_short_circuits_lookup() {
        let provider = MockAiProvider::new();
        let kb = MockKnowledgeBase::new();
        let agent = agent(&provider, &kb);

        let mut ctx = AnalysisContext::new("req");
        ctx.apply(ContextUpdate {
            risk_hint: Some("Perte de confidentialité des données clients".to_string()),
            ..Default::default()
        });

        let outcome = agent.execute(&ctx).await;

        assert_eq!(
            outcome.update.risk.as_deref(),
            Some("Perte de confidentialité des données clients")
        );
        assert_eq!(kb.threat_risk_calls(), 0);
        assert_eq!(provider.call_count(), 0);
        assert_eq!(outcome.messages[0].to_step, StepName::Implementation);
    }

    #[tokio::test]
    async fn test_catalog_risk_without_hint() {
        let provider = MockAiProvider::new();
        let kb = MockKnowledgeBase::new().with_threat_risk(ThreatRisk {
            threat: None,
            risk: Some("Amendes réglementaires".to_string()),
        });
        let agent = agent(&provider, &kb);

        let outcome = agent.execute(&AnalysisContext::new("req")).await;

        assert_eq!(outcome.update.risk.as_deref(), Some("Amendes réglementaires"));
        assert_eq!(kb.threat_risk_calls(), 1);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_catalog_risk_uses_fallback() {
        let provider = MockAiProvider::new().with_response("Risque de fuite massive de données.");
        let kb = MockKnowledgeBase::new().with_threat_risk(ThreatRisk {
            threat: None,
            risk: Some("  ".to_string()),
        });
        let agent = agent(&provider, &kb);

        let outcome = agent.execute(&AnalysisContext::new("req")).await;
        assert_eq!(
            outcome.update.risk.as_deref(),
            Some("Risque de fuite massive de données.")
        );
    }

    #[tokio::test]
    async fn test_lookup_error_uses_fallback() {
        let provider = MockAiProvider::new().with_response("Risque généré.");
        let kb = MockKnowledgeBase::new()
            .with_threat_risk_failure(KnowledgeBaseError::Service("HTTP 500".to_string()));
        let agent = agent(&provider, &kb);

        let outcome = agent.execute(&AnalysisContext::new("req")).await;
        assert!(outcome.success);
        assert_eq!(outcome.update.risk.as_deref(), Some("Risque généré."));
    }
}
