//! Requirement input and final analysis result.

use serde::{Deserialize, Serialize};

use super::context::AnalysisContext;

/// Placeholder used for mapping fields the analysis could not populate.
pub const NOT_MAPPED: &str = "Non mappé";

/// One security requirement submitted for analysis. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: i64,
    pub text: String,
}

impl Requirement {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// Structured result of one full orchestration run.
///
/// Always a complete, renderable row: mapping fields fall back to
/// [`NOT_MAPPED`] and are never empty strings. Serialized in camelCase for
/// the dashboard collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: i64,
    pub requirement: String,
    pub verification_point: String,
    pub scf_mapping: String,
    pub iso27001_mapping: String,
    pub iso27002_mapping: String,
    pub cobit5_mapping: String,
    pub analysis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_implementation: Option<String>,
}

impl AnalysisResult {
    /// Assembles the final result from a completed context.
    pub fn from_context(id: i64, ctx: &AnalysisContext) -> Self {
        let mapped = |field: &Option<String>| {
            field.clone().unwrap_or_else(|| NOT_MAPPED.to_string())
        };

        Self {
            id,
            requirement: ctx.requirement_text.clone(),
            verification_point: ctx.verification_point.clone().unwrap_or_default(),
            scf_mapping: mapped(&ctx.scf_mapping),
            iso27001_mapping: mapped(&ctx.iso27001_mapping),
            iso27002_mapping: mapped(&ctx.iso27002_mapping),
            cobit5_mapping: mapped(&ctx.cobit5_mapping),
            analysis: ctx.analysis.clone().unwrap_or_default(),
            threat: ctx.threat.clone(),
            risk: ctx.risk.clone(),
            control_implementation: ctx.control_implementation.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::ContextUpdate;

    #[test]
    fn test_empty_context_yields_placeholders() {
        let ctx = AnalysisContext::new("Exiger le chiffrement");
        let result = AnalysisResult::from_context(3, &ctx);

        assert_eq!(result.id, 3);
        assert_eq!(result.requirement, "Exiger le chiffrement");
        assert_eq!(result.scf_mapping, NOT_MAPPED);
        assert_eq!(result.iso27001_mapping, NOT_MAPPED);
        assert_eq!(result.iso27002_mapping, NOT_MAPPED);
        assert_eq!(result.cobit5_mapping, NOT_MAPPED);
        assert!(result.threat.is_none());
        assert!(result.risk.is_none());
    }

    #[test]
    fn test_populated_context_carries_through() {
        let mut ctx = AnalysisContext::new("req");
        ctx.apply(ContextUpdate {
            scf_mapping: Some("IAC-01 - Access Control Governance".to_string()),
            threat: Some("Usurpation de compte".to_string()),
            ..Default::default()
        });

        let result = AnalysisResult::from_context(1, &ctx);
        assert_eq!(result.scf_mapping, "IAC-01 - Access Control Governance");
        assert_eq!(result.threat.as_deref(), Some("Usurpation de compte"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let ctx = AnalysisContext::new("req");
        let result = AnalysisResult::from_context(1, &ctx);
        let json = serde_json::to_value(&result).unwrap();

        assert!(json.get("scfMapping").is_some());
        assert!(json.get("verificationPoint").is_some());
        // Absent optional fields are omitted entirely
        assert!(json.get("threat").is_none());
    }
}
