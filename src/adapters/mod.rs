//! Adapters - Implementations of the ports against real and test backends.

pub mod ai;
pub mod knowledge_base;
