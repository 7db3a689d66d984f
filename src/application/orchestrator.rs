//! Orchestrator - five-phase analysis flow over the eight step agents.
//!
//! Phase layout mirrors the data dependencies between steps:
//!
//! 1. Verification point (alone, its output feeds every later prompt)
//! 2. SCF, ISO and COBIT mappings (concurrent, disjoint context fields)
//! 3. Threat then Risk (sequential, the risk builds on the threat)
//! 4. Implementation guide
//! 5. Final synthesis
//!
//! Each phase runs against a snapshot of the shared context; updates are
//! merged at the phase boundary in a fixed order, so concurrent steps never
//! observe each other's partial output. Step failures are self-contained
//! (the agent reports `success: false` and the run carries on); only a panic
//! inside an agent aborts the run.

use std::sync::Arc;

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{debug, info, warn};

use crate::config::KnowledgeBaseConfig;
use crate::domain::analysis::{
    AgentMessage, AnalysisContext, AnalysisResult, Requirement, StepName,
};
use crate::ports::{AiProvider, KnowledgeBase};

use super::agents::{
    CobitAgent, ImplementationAgent, IsoAgent, RiskAgent, ScfAgent, StepAgent, StepInvoker,
    StepOutcome, SynthesizerAgent, ThreatAgent, VerificationPointAgent,
};

/// Failures that abort an orchestration run.
///
/// Lookup and generation errors are absorbed by the agents themselves, so the
/// only abort cause left is a defect inside an agent.
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    /// An agent panicked; the run cannot be trusted past this point.
    #[error("step {step} panicked during execution")]
    StepPanicked { step: StepName },
}

/// Runs the multi-agent analysis over security requirements.
pub struct Orchestrator {
    verification: VerificationPointAgent,
    scf: ScfAgent,
    iso: IsoAgent,
    cobit: CobitAgent,
    threat: ThreatAgent,
    risk: RiskAgent,
    implementation: ImplementationAgent,
    synthesizer: SynthesizerAgent,
}

impl Orchestrator {
    /// Wires all eight agents against the given provider and knowledge base.
    pub fn new(provider: Arc<dyn AiProvider>, knowledge_base: Arc<dyn KnowledgeBase>) -> Self {
        let invoker = StepInvoker::new(provider);

        Self {
            verification: VerificationPointAgent::new(invoker.clone()),
            scf: ScfAgent::new(invoker.clone(), Arc::clone(&knowledge_base)),
            iso: IsoAgent::new(invoker.clone()),
            cobit: CobitAgent::new(invoker.clone()),
            threat: ThreatAgent::new(invoker.clone(), Arc::clone(&knowledge_base)),
            risk: RiskAgent::new(invoker.clone(), knowledge_base),
            implementation: ImplementationAgent::new(invoker.clone()),
            synthesizer: SynthesizerAgent::new(invoker),
        }
    }

    /// Wires the agents and applies knowledge-base tuning from configuration.
    pub fn from_app(
        provider: Arc<dyn AiProvider>,
        knowledge_base: Arc<dyn KnowledgeBase>,
        config: &KnowledgeBaseConfig,
    ) -> Self {
        Self::new(provider, knowledge_base).with_search_top_k(config.top_k)
    }

    /// Overrides the number of catalog candidates the SCF step requests.
    pub fn with_search_top_k(mut self, top_k: usize) -> Self {
        self.scf = self.scf.with_top_k(top_k);
        self
    }

    /// Analyzes one requirement through all five phases.
    pub async fn analyze_one(
        &self,
        requirement: &Requirement,
    ) -> Result<AnalysisResult, OrchestrationError> {
        let id = requirement.id;
        info!(id, "starting multi-agent analysis");
        let mut ctx = AnalysisContext::new(requirement.text.as_str());
        let mut message_log: Vec<AgentMessage> = Vec::new();

        // Phase 1: verification point
        let outcome = run_step(&self.verification, &ctx).await?;
        apply_outcome(&mut ctx, &mut message_log, outcome);

        // Phase 2: framework mappings, concurrent over a shared snapshot.
        // Merge order is fixed so runs are reproducible.
        let (scf, iso, cobit) = tokio::join!(
            run_step(&self.scf, &ctx),
            run_step(&self.iso, &ctx),
            run_step(&self.cobit, &ctx),
        );
        for outcome in [scf?, iso?, cobit?] {
            apply_outcome(&mut ctx, &mut message_log, outcome);
        }

        // Phase 3: threat then risk
        let outcome = run_step(&self.threat, &ctx).await?;
        apply_outcome(&mut ctx, &mut message_log, outcome);
        let outcome = run_step(&self.risk, &ctx).await?;
        apply_outcome(&mut ctx, &mut message_log, outcome);

        // Phase 4: implementation guide
        let outcome = run_step(&self.implementation, &ctx).await?;
        apply_outcome(&mut ctx, &mut message_log, outcome);

        // Phase 5: synthesis
        let outcome = run_step(&self.synthesizer, &ctx).await?;
        apply_outcome(&mut ctx, &mut message_log, outcome);

        info!(id, messages = message_log.len(), "analysis complete");
        Ok(AnalysisResult::from_context(id, &ctx))
    }

    /// Analyzes a batch sequentially, reporting progress after each item.
    ///
    /// Identifiers are positional, starting at 1. The batch is fail-fast: an
    /// aborted run stops the remaining items, since a panicking agent would
    /// fail them identically.
    pub async fn analyze_many(
        &self,
        requirements: &[String],
        mut on_progress: Option<&mut dyn FnMut(usize, usize)>,
    ) -> Result<Vec<AnalysisResult>, OrchestrationError> {
        let total = requirements.len();
        let mut results = Vec::with_capacity(total);

        for (index, text) in requirements.iter().enumerate() {
            let requirement = Requirement::new((index + 1) as i64, text.clone());
            let result = self.analyze_one(&requirement).await?;
            results.push(result);
            if let Some(callback) = on_progress.as_deref_mut() {
                callback(index + 1, total);
            }
        }

        Ok(results)
    }
}

/// Runs one step, converting a panic into a typed abort.
async fn run_step<A: StepAgent + ?Sized>(
    agent: &A,
    ctx: &AnalysisContext,
) -> Result<StepOutcome, OrchestrationError> {
    let step = agent.step();
    AssertUnwindSafe(agent.execute(ctx))
        .catch_unwind()
        .await
        .map_err(|_| OrchestrationError::StepPanicked { step })
}

/// Merges a step outcome into the context and the message log.
fn apply_outcome(
    ctx: &mut AnalysisContext,
    message_log: &mut Vec<AgentMessage>,
    outcome: StepOutcome,
) {
    if outcome.success {
        debug!(step = %outcome.step, "step completed");
    } else {
        warn!(
            step = %outcome.step,
            detail = outcome.error_detail.as_deref().unwrap_or("unknown"),
            "step failed, continuing with partial context"
        );
    }

    ctx.apply(outcome.update);
    if let Some(insight) = outcome.insight {
        ctx.add_insight(outcome.step, insight);
    }
    for message in &outcome.messages {
        debug!(
            from = %message.from_step,
            to = %message.to_step,
            content = %message.content,
            "agent message"
        );
    }
    message_log.extend(outcome.messages);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAiProvider;
    use crate::adapters::knowledge_base::MockKnowledgeBase;
    use crate::domain::analysis::NOT_MAPPED;
    use crate::ports::ThreatRisk;

    fn orchestrator(provider: &MockAiProvider, kb: &MockKnowledgeBase) -> Orchestrator {
        Orchestrator::new(Arc::new(provider.clone()), Arc::new(kb.clone()))
    }

    #[tokio::test]
    async fn test_full_run_yields_complete_result() {
        // Catalog serves SCF and threat/risk; generation covers the rest.
        let provider = MockAiProvider::new();
        let kb = MockKnowledgeBase::new()
            .with_search_results(vec![MockKnowledgeBase::control(
                "IAC-01",
                "Access Control Governance",
                0.88,
            )])
            .with_threat_risk(ThreatRisk {
                threat: Some("Usurpation de compte".to_string()),
                risk: Some("Perte de données".to_string()),
            });

        let result = orchestrator(&provider, &kb)
            .analyze_one(&Requirement::new(7, "Restreindre les accès privilégiés"))
            .await
            .unwrap();

        assert_eq!(result.id, 7);
        assert_eq!(result.scf_mapping, "IAC-01 - Access Control Governance");
        assert_eq!(result.threat.as_deref(), Some("Usurpation de compte"));
        assert_eq!(result.risk.as_deref(), Some("Perte de données"));
        assert_eq!(result.verification_point, "réponse simulée");
    }

    #[tokio::test]
    async fn test_risk_hint_avoids_second_lookup() {
        let provider = MockAiProvider::new();
        let kb = MockKnowledgeBase::new().with_threat_risk(ThreatRisk {
            threat: Some("Menace".to_string()),
            risk: Some("Risque associé".to_string()),
        });

        let result = orchestrator(&provider, &kb)
            .analyze_one(&Requirement::new(1, "req"))
            .await
            .unwrap();

        assert_eq!(result.risk.as_deref(), Some("Risque associé"));
        assert_eq!(kb.threat_risk_calls(), 1);
    }

    #[tokio::test]
    async fn test_from_app_threads_search_top_k() {
        let provider = MockAiProvider::new();
        let kb = MockKnowledgeBase::new();
        let config = KnowledgeBaseConfig {
            top_k: 3,
            ..Default::default()
        };

        Orchestrator::from_app(Arc::new(provider.clone()), Arc::new(kb.clone()), &config)
            .analyze_one(&Requirement::new(1, "req"))
            .await
            .unwrap();

        assert_eq!(kb.last_search_top_k(), Some(3));
    }

    #[tokio::test]
    async fn test_unmapped_fields_get_placeholder() {
        // Empty catalog and a mock answering free text with no markers: all
        // marker-parsed mappings must fall back to the placeholder.
        let provider = MockAiProvider::new();
        let kb = MockKnowledgeBase::new();

        let result = orchestrator(&provider, &kb)
            .analyze_one(&Requirement::new(1, "req"))
            .await
            .unwrap();

        assert_eq!(result.iso27001_mapping, NOT_MAPPED);
        assert_eq!(result.iso27002_mapping, NOT_MAPPED);
        // Markerless single-line answers still count for SCF and COBIT
        // through the first-line fallback.
        assert_eq!(result.scf_mapping, "réponse simulée");
    }

    #[tokio::test]
    async fn test_analyze_many_assigns_positional_ids() {
        let provider = MockAiProvider::new();
        let kb = MockKnowledgeBase::new();
        let requirements = vec!["premier".to_string(), "second".to_string()];

        let mut seen: Vec<(usize, usize)> = Vec::new();
        let mut callback = |done: usize, total: usize| seen.push((done, total));

        let results = orchestrator(&provider, &kb)
            .analyze_many(&requirements, Some(&mut callback))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, 1);
        assert_eq!(results[1].id, 2);
        assert_eq!(seen, vec![(1, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn test_analyze_many_without_callback() {
        let provider = MockAiProvider::new();
        let kb = MockKnowledgeBase::new();

        let results = orchestrator(&provider, &kb)
            .analyze_many(&["seul".to_string()], None)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].requirement, "seul");
    }
}
