//! Mock Knowledge Base for testing.
//!
//! Scripted responses per endpoint plus per-endpoint call counters, so tests
//! can assert both fallback behavior and how many lookups a step performed.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::ports::{
    ControlMatch, KnowledgeBase, KnowledgeBaseError, ThreatRisk, ValidationVerdict,
};

/// Mock knowledge base with fixed scripted responses.
#[derive(Debug, Clone)]
pub struct MockKnowledgeBase {
    search_response: Result<Vec<ControlMatch>, KnowledgeBaseError>,
    validation_response: Result<ValidationVerdict, KnowledgeBaseError>,
    threat_risk_response: Result<ThreatRisk, KnowledgeBaseError>,
    search_calls: Arc<AtomicUsize>,
    validate_calls: Arc<AtomicUsize>,
    threat_risk_calls: Arc<AtomicUsize>,
    last_search_top_k: Arc<Mutex<Option<usize>>>,
}

impl Default for MockKnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl MockKnowledgeBase {
    /// Creates a mock with neutral defaults: empty search results, a valid
    /// verdict and an empty threat/risk pair.
    pub fn new() -> Self {
        Self {
            search_response: Ok(Vec::new()),
            validation_response: Ok(ValidationVerdict {
                is_valid: true,
                scf_id: None,
                scf_control: None,
                message: "ok".to_string(),
            }),
            threat_risk_response: Ok(ThreatRisk::default()),
            search_calls: Arc::new(AtomicUsize::new(0)),
            validate_calls: Arc::new(AtomicUsize::new(0)),
            threat_risk_calls: Arc::new(AtomicUsize::new(0)),
            last_search_top_k: Arc::new(Mutex::new(None)),
        }
    }

    /// Convenience constructor for a control match with the given identity
    /// and score; remaining catalog fields get filler values.
    pub fn control(scf_id: &str, scf_control: &str, similarity_score: f64) -> ControlMatch {
        ControlMatch {
            scf_id: scf_id.to_string(),
            scf_control: scf_control.to_string(),
            scf_domain: "Identification & Authentication".to_string(),
            description: "Mechanisms exist to enforce this control.".to_string(),
            cobit_2019: String::new(),
            control_question: String::new(),
            possible_solutions: String::new(),
            similarity_score,
        }
    }

    pub fn with_search_results(mut self, results: Vec<ControlMatch>) -> Self {
        self.search_response = Ok(results);
        self
    }

    pub fn with_search_failure(mut self, error: KnowledgeBaseError) -> Self {
        self.search_response = Err(error);
        self
    }

    pub fn with_validation(mut self, verdict: ValidationVerdict) -> Self {
        self.validation_response = Ok(verdict);
        self
    }

    pub fn with_validation_failure(mut self, error: KnowledgeBaseError) -> Self {
        self.validation_response = Err(error);
        self
    }

    pub fn with_threat_risk(mut self, threat_risk: ThreatRisk) -> Self {
        self.threat_risk_response = Ok(threat_risk);
        self
    }

    pub fn with_threat_risk_failure(mut self, error: KnowledgeBaseError) -> Self {
        self.threat_risk_response = Err(error);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    pub fn threat_risk_calls(&self) -> usize {
        self.threat_risk_calls.load(Ordering::SeqCst)
    }

    /// The `top_k` of the most recent search, if any search was made.
    pub fn last_search_top_k(&self) -> Option<usize> {
        *self.last_search_top_k.lock().unwrap()
    }
}

#[async_trait]
impl KnowledgeBase for MockKnowledgeBase {
    async fn search_controls(
        &self,
        _requirement_text: &str,
        top_k: usize,
    ) -> Result<Vec<ControlMatch>, KnowledgeBaseError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_search_top_k.lock().unwrap() = Some(top_k);
        self.search_response.clone()
    }

    async fn validate_control(
        &self,
        _scf_id: &str,
    ) -> Result<ValidationVerdict, KnowledgeBaseError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        self.validation_response.clone()
    }

    async fn find_threat_and_risk(
        &self,
        _requirement_text: &str,
    ) -> Result<ThreatRisk, KnowledgeBaseError> {
        self.threat_risk_calls.fetch_add(1, Ordering::SeqCst);
        self.threat_risk_response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_are_neutral() {
        let kb = MockKnowledgeBase::new();

        assert!(kb.search_controls("req", 5).await.unwrap().is_empty());
        assert!(kb.validate_control("IAC-01").await.unwrap().is_valid);
        assert_eq!(kb.find_threat_and_risk("req").await.unwrap(), ThreatRisk::default());
    }

    #[tokio::test]
    async fn test_scripted_search_results() {
        let kb = MockKnowledgeBase::new().with_search_results(vec![MockKnowledgeBase::control(
            "IAC-01",
            "Access Control Governance",
            0.91,
        )]);

        let results = kb.search_controls("req", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].scf_id, "IAC-01");
    }

    #[tokio::test]
    async fn test_counters_track_calls() {
        let kb = MockKnowledgeBase::new();
        kb.search_controls("req", 5).await.unwrap();
        kb.find_threat_and_risk("req").await.unwrap();
        kb.find_threat_and_risk("req").await.unwrap();

        assert_eq!(kb.search_calls(), 1);
        assert_eq!(kb.validate_calls(), 0);
        assert_eq!(kb.threat_risk_calls(), 2);
    }

    #[tokio::test]
    async fn test_records_last_search_top_k() {
        let kb = MockKnowledgeBase::new();
        assert_eq!(kb.last_search_top_k(), None);

        kb.search_controls("req", 3).await.unwrap();
        assert_eq!(kb.last_search_top_k(), Some(3));
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let kb = MockKnowledgeBase::new()
            .with_search_failure(KnowledgeBaseError::Timeout { timeout_secs: 10 });

        let err = kb.search_controls("req", 5).await.unwrap_err();
        assert!(matches!(err, KnowledgeBaseError::Timeout { .. }));
    }
}
