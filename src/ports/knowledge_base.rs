//! Knowledge Base Port - Interface to the curated SCF catalog service.
//!
//! Three independent request/response operations, each bounded by a fixed
//! client-side timeout on the adapter side. Failures are always absorbed by
//! the calling step agent (which falls back to LLM generation) and never
//! reach the orchestrator raw.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One control candidate returned by semantic search, with its similarity
/// score. Results are ordered most-similar first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlMatch {
    pub scf_id: String,
    pub scf_control: String,
    pub scf_domain: String,
    pub description: String,
    /// Adjacent-framework reference carried by the catalog, relayed to the
    /// COBIT step when non-blank.
    pub cobit_2019: String,
    pub control_question: String,
    pub possible_solutions: String,
    pub similarity_score: f64,
}

/// Verdict of a control-reference validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    pub scf_id: Option<String>,
    pub scf_control: Option<String>,
    pub message: String,
}

/// Threat/risk pair from the catalog; either side may be absent independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatRisk {
    pub threat: Option<String>,
    pub risk: Option<String>,
}

/// Knowledge base lookup errors.
///
/// `Timeout` is kept distinct from `Service` so operators can tell a slow
/// backend from a broken one in the logs.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KnowledgeBaseError {
    /// The request exceeded the client-side timeout.
    #[error("knowledge base request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Non-2xx response or transport failure.
    #[error("knowledge base service error: {0}")]
    Service(String),
}

/// Port for the curated control/threat/risk catalog.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Semantic search over the control catalog.
    ///
    /// The similarity threshold is applied server-side; an empty result is a
    /// valid "no confident match" outcome, not an error.
    async fn search_controls(
        &self,
        requirement_text: &str,
        top_k: usize,
    ) -> Result<Vec<ControlMatch>, KnowledgeBaseError>;

    /// Checks that an SCF reference exists in the catalog.
    async fn validate_control(&self, scf_id: &str)
        -> Result<ValidationVerdict, KnowledgeBaseError>;

    /// Looks up the threat and risk entries matching a requirement.
    async fn find_threat_and_risk(
        &self,
        requirement_text: &str,
    ) -> Result<ThreatRisk, KnowledgeBaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_match_deserializes_backend_shape() {
        let json = r#"{
            "scf_id": "IAC-01",
            "scf_control": "Access Control Governance",
            "scf_domain": "Identification & Authentication",
            "description": "Mechanisms exist to facilitate identity and access management.",
            "cobit_2019": "DSS05.04",
            "control_question": "Does the organization govern access?",
            "possible_solutions": "IAM platform",
            "similarity_score": 0.91
        }"#;

        let control: ControlMatch = serde_json::from_str(json).unwrap();
        assert_eq!(control.scf_id, "IAC-01");
        assert_eq!(control.similarity_score, 0.91);
    }

    #[test]
    fn test_threat_risk_fields_independent() {
        let json = r#"{"threat": "Credential stuffing", "risk": null}"#;
        let tr: ThreatRisk = serde_json::from_str(json).unwrap();

        assert_eq!(tr.threat.as_deref(), Some("Credential stuffing"));
        assert!(tr.risk.is_none());
    }

    #[test]
    fn test_error_display_distinguishes_timeout() {
        let timeout = KnowledgeBaseError::Timeout { timeout_secs: 10 };
        let service = KnowledgeBaseError::Service("HTTP 503".to_string());

        assert!(timeout.to_string().contains("timed out after 10s"));
        assert!(service.to_string().contains("HTTP 503"));
    }
}
