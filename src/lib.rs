//! Compliance Mapper - Multi-Agent Requirement Analysis Engine
//!
//! This crate analyzes free-text security requirements and maps them to
//! external control frameworks (SCF, ISO 27001/27002, COBIT 5) through
//! eight specialized reasoning agents coordinated by an orchestrator.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
