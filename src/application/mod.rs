//! Application layer - step agents and the orchestration engine.

pub mod agents;
mod orchestrator;

pub use orchestrator::{OrchestrationError, Orchestrator};
