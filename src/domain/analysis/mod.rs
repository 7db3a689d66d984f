//! Analysis domain - shared context, inter-agent messages and result assembly.
//!
//! Everything here is pure data and pure functions. Agents and the
//! orchestrator (application layer) drive the mutations through explicit
//! [`ContextUpdate`] values merged at phase boundaries.

mod context;
mod message;
mod parsing;
mod result;
mod step;

pub use context::{AnalysisContext, ContextUpdate};
pub use message::{AgentMessage, MessageKind};
pub use parsing::{marker_line, parse_iso_lines, IsoMappings};
pub use result::{AnalysisResult, Requirement, NOT_MAPPED};
pub use step::StepName;
