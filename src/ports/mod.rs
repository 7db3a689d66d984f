//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the analysis engine and the outside world. Adapters implement these ports.
//!
//! - `AiProvider` - LLM completion endpoint used by the reasoning steps
//! - `KnowledgeBase` - curated SCF control/threat/risk catalog lookups

mod ai_provider;
mod knowledge_base;

pub use ai_provider::{
    AiError, AiProvider, CompletionRequest, CompletionResponse, FinishReason, Message, MessageRole,
};
pub use knowledge_base::{
    ControlMatch, KnowledgeBase, KnowledgeBaseError, ThreatRisk, ValidationVerdict,
};
