//! SCF mapping agent - phase 2, knowledge-base first with LLM fallback.
//!
//! Preference order: a validated catalog control (cheaper, auditable,
//! consistent) over generated text. The fallback fires on empty search
//! results, failed validation, or any lookup error, and reuses the shared
//! preamble so generated mappings stay consistent with the rest of the
//! context.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::analysis::{marker_line, AgentMessage, AnalysisContext, ContextUpdate, StepName};
use crate::ports::{KnowledgeBase, KnowledgeBaseError};

use super::{GenerationParams, StepAgent, StepInvoker, StepOutcome};

const FALLBACK_PARAMS: GenerationParams = GenerationParams::new(400, 0.1);
const MARKER: &str = "SCF:";
const DEFAULT_TOP_K: usize = 5;

/// Maps the requirement to a Secure Controls Framework control.
pub struct ScfAgent {
    invoker: StepInvoker,
    knowledge_base: Arc<dyn KnowledgeBase>,
    top_k: usize,
}

impl ScfAgent {
    pub fn new(invoker: StepInvoker, knowledge_base: Arc<dyn KnowledgeBase>) -> Self {
        Self {
            invoker,
            knowledge_base,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Overrides the number of candidates requested per search.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Catalog path. `Ok(None)` means "no confident, validated match" and
    /// sends the caller to the fallback.
    async fn lookup(&self, ctx: &AnalysisContext) -> Result<Option<StepOutcome>, KnowledgeBaseError> {
        let results = self
            .knowledge_base
            .search_controls(&ctx.requirement_text, self.top_k)
            .await?;

        let Some(best) = results.first() else {
            debug!(step = %self.step(), "no control above similarity threshold");
            return Ok(None);
        };

        let verdict = self.knowledge_base.validate_control(&best.scf_id).await?;
        if !verdict.is_valid {
            warn!(step = %self.step(), scf_id = %best.scf_id, "catalog match failed validation");
            return Ok(None);
        }

        let mapping = format!("{} - {}", best.scf_id, best.scf_control);
        let insight = format!(
            "Contrôle SCF validé depuis la base de connaissances (similarité: {:.1}%). Domaine: {}",
            best.similarity_score * 100.0,
            best.scf_domain
        );

        let cobit_hint = Some(best.cobit_2019.trim())
            .filter(|h| !h.is_empty())
            .map(ToString::to_string);

        Ok(Some(
            StepOutcome::success(
                self.step(),
                ContextUpdate {
                    scf_mapping: Some(mapping.clone()),
                    cobit_hint,
                    ..Default::default()
                },
            )
            .with_insight(insight)
            .with_message(AgentMessage::context(
                self.step(),
                StepName::Iso,
                format!("SCF vérifié: {mapping}"),
            )),
        ))
    }

    /// LLM fallback when the catalog has no confident answer or is unreachable.
    async fn fallback(&self, ctx: &AnalysisContext) -> StepOutcome {
        let prompt = format!(
            "{preamble}\n\
             TU ES: Agent expert en Secure Controls Framework (SCF 2025.2)\n\n\
             TA MISSION: Identifie le contrôle SCF le plus pertinent pour cette exigence.\n\n\
             CRITÈRES:\n\
             - Référence SCF complète (ex: \"GOV-01 - Governance Program\")\n\
             - Format: \"DOMAINE-XX - Titre du contrôle\"\n\
             - Domaines SCF courants: GOV (Gouvernance), IAC (Contrôle d'accès), NET (Sécurité réseau), etc.\n\
             - Cohérence avec le contexte de l'exigence\n\n\
             Format de sortie:\n\
             SCF: DOMAINE-XX - Titre\n\
             Justification: [1 phrase]\n\n\
             Réponds UNIQUEMENT avec ce format, sans markdown.",
            preamble = ctx.render_preamble()
        );

        match self.invoker.invoke(&prompt, FALLBACK_PARAMS).await {
            Ok(text) => {
                let mapping = marker_line(&text, MARKER);
                StepOutcome::success(
                    self.step(),
                    ContextUpdate {
                        scf_mapping: mapping,
                        ..Default::default()
                    },
                )
                .with_insight("Contrôle SCF généré par IA (base de connaissances non disponible)")
                .with_message(AgentMessage::context(
                    self.step(),
                    StepName::Iso,
                    "SCF identifié par génération",
                ))
            }
            Err(err) => {
                warn!(step = %self.step(), error = %err, "SCF fallback generation failed");
                StepOutcome::failure(self.step(), err.to_string())
            }
        }
    }
}

#[async_trait]
impl StepAgent for ScfAgent {
    fn step(&self) -> StepName {
        StepName::Scf
    }

    async fn execute(&self, ctx: &AnalysisContext) -> StepOutcome {
        match self.lookup(ctx).await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => self.fallback(ctx).await,
            Err(err) => {
                warn!(step = %self.step(), error = %err, "SCF lookup unavailable, falling back to generation");
                self.fallback(ctx).await
            }
        }
    }
}
