//! Synthesizer agent - phase 5, LLM only.
//!
//! Closes the run with a short justification of the mappings' coherence.

use async_trait::async_trait;
use tracing::warn;

use crate::domain::analysis::{AnalysisContext, ContextUpdate, StepName};

use super::{GenerationParams, StepAgent, StepInvoker, StepOutcome};

const PARAMS: GenerationParams = GenerationParams::new(300, 0.1);

/// Writes the final justification analysis over the full shared context.
pub struct SynthesizerAgent {
    invoker: StepInvoker,
}

impl SynthesizerAgent {
    pub fn new(invoker: StepInvoker) -> Self {
        Self { invoker }
    }

    fn prompt(&self, ctx: &AnalysisContext) -> String {
        format!(
            "{preamble}\n\
             TU ES: Agent de synthèse et validation finale\n\n\
             TA MISSION: Rédige une analyse justificative concise (1-2 phrases) expliquant la cohérence des mappings identifiés par les autres agents.\n\n\
             Réponds UNIQUEMENT avec l'analyse de justification, sans préambule ni markdown.",
            preamble = ctx.render_preamble()
        )
    }
}

#[async_trait]
impl StepAgent for SynthesizerAgent {
    fn step(&self) -> StepName {
        StepName::Synthesizer
    }

    async fn execute(&self, ctx: &AnalysisContext) -> StepOutcome {
        match self.invoker.invoke(&self.prompt(ctx), PARAMS).await {
            Ok(text) => StepOutcome::success(
                self.step(),
                ContextUpdate {
                    analysis: Some(text),
                    ..Default::default()
                },
            )
            .with_insight("Synthèse finalisée"),
            Err(err) => {
                warn!(step = %self.step(), error = %err, "synthesis generation failed");
                StepOutcome::failure(self.step(), err.to_string())
            }
        }
    }
}
