//! Step identifiers for the eight analysis agents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the eight specialized analysis steps.
///
/// The orchestrator schedules these in five phases: VerificationPoint,
/// then Scf/Iso/Cobit concurrently, then Threat and Risk sequentially,
/// then Implementation, then Synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepName {
    VerificationPoint,
    Scf,
    Iso,
    Cobit,
    Threat,
    Risk,
    Implementation,
    Synthesizer,
}

impl StepName {
    /// Stable label used in insight keys, notifications and logs.
    pub fn agent_label(&self) -> &'static str {
        match self {
            StepName::VerificationPoint => "Agent-VerificationPoint",
            StepName::Scf => "Agent-SCF",
            StepName::Iso => "Agent-ISO",
            StepName::Cobit => "Agent-COBIT",
            StepName::Threat => "Agent-Threat",
            StepName::Risk => "Agent-Risk",
            StepName::Implementation => "Agent-Implementation",
            StepName::Synthesizer => "Agent-Synthesizer",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.agent_label())
    }
}
