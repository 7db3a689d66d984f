//! Shared analysis context.
//!
//! One context is created per orchestration run and exclusively owned by it.
//! Agents never mutate the context directly: each step returns a
//! [`ContextUpdate`] that the orchestrator merges at a phase boundary, so the
//! concurrent mapping phase stays race-free by construction.

use super::step::StepName;

/// Accumulating record of everything discovered about one requirement.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    /// The requirement under analysis. Set at creation, never mutated.
    pub requirement_text: String,
    pub verification_point: Option<String>,
    pub scf_mapping: Option<String>,
    pub iso27001_mapping: Option<String>,
    pub iso27002_mapping: Option<String>,
    pub cobit5_mapping: Option<String>,
    pub threat: Option<String>,
    pub risk: Option<String>,
    pub control_implementation: Option<String>,
    pub analysis: Option<String>,
    /// COBIT reference harvested from the SCF lookup, relayed to the COBIT step.
    pub cobit_hint: Option<String>,
    /// Risk text harvested from the threat lookup, relayed to the Risk step.
    pub risk_hint: Option<String>,
    /// Free-text insights keyed by agent label, in insertion order.
    insights: Vec<(String, String)>,
}

/// Fields discovered by one step, merged into the context by the orchestrator.
///
/// Each field is written at most once by its owning step; steps running
/// concurrently write disjoint fields.
#[derive(Debug, Clone, Default)]
pub struct ContextUpdate {
    pub verification_point: Option<String>,
    pub scf_mapping: Option<String>,
    pub iso27001_mapping: Option<String>,
    pub iso27002_mapping: Option<String>,
    pub cobit5_mapping: Option<String>,
    pub threat: Option<String>,
    pub risk: Option<String>,
    pub control_implementation: Option<String>,
    pub analysis: Option<String>,
    pub cobit_hint: Option<String>,
    pub risk_hint: Option<String>,
}

impl AnalysisContext {
    /// Creates a fresh context for one requirement.
    pub fn new(requirement_text: impl Into<String>) -> Self {
        Self {
            requirement_text: requirement_text.into(),
            verification_point: None,
            scf_mapping: None,
            iso27001_mapping: None,
            iso27002_mapping: None,
            cobit5_mapping: None,
            threat: None,
            risk: None,
            control_implementation: None,
            analysis: None,
            cobit_hint: None,
            risk_hint: None,
            insights: Vec::new(),
        }
    }

    /// Merges the non-empty fields of an update into the context.
    pub fn apply(&mut self, update: ContextUpdate) {
        merge(&mut self.verification_point, update.verification_point);
        merge(&mut self.scf_mapping, update.scf_mapping);
        merge(&mut self.iso27001_mapping, update.iso27001_mapping);
        merge(&mut self.iso27002_mapping, update.iso27002_mapping);
        merge(&mut self.cobit5_mapping, update.cobit5_mapping);
        merge(&mut self.threat, update.threat);
        merge(&mut self.risk, update.risk);
        merge(&mut self.control_implementation, update.control_implementation);
        merge(&mut self.analysis, update.analysis);
        merge(&mut self.cobit_hint, update.cobit_hint);
        merge(&mut self.risk_hint, update.risk_hint);
    }

    /// Appends a free-text insight under the agent's label.
    pub fn add_insight(&mut self, step: StepName, insight: impl Into<String>) {
        self.insights.push((step.agent_label().to_string(), insight.into()));
    }

    /// Recorded insights in insertion order.
    pub fn insights(&self) -> &[(String, String)] {
        &self.insights
    }

    /// Renders the deterministic shared-context section used in every prompt.
    ///
    /// Field order is fixed; unset fields are omitted rather than shown empty.
    pub fn render_preamble(&self) -> String {
        let mut out = String::from("CONTEXTE PARTAGÉ:\n");
        out.push_str(&format!("Exigence analysée: \"{}\"\n", self.requirement_text));

        let known = [
            ("Point de vérification", &self.verification_point),
            ("SCF identifié", &self.scf_mapping),
            ("ISO 27001 identifié", &self.iso27001_mapping),
            ("ISO 27002 identifié", &self.iso27002_mapping),
            ("COBIT 5 identifié", &self.cobit5_mapping),
            ("Menace identifiée", &self.threat),
            ("Risque identifié", &self.risk),
        ];
        for (label, value) in known {
            if let Some(value) = value {
                out.push_str(&format!("{label}: {value}\n"));
            }
        }

        if !self.insights.is_empty() {
            out.push_str("\nINSIGHTS DES AUTRES AGENTS:\n");
            for (agent, insight) in &self.insights {
                out.push_str(&format!("• {agent}: {insight}\n"));
            }
        }

        out
    }
}

fn merge(slot: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        *slot = Some(value);
    }
}
