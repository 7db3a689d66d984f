//! HTTP Knowledge Base - Implementation of the KnowledgeBase port against the
//! SCF backend service.
//!
//! Three POST endpoints with JSON bodies:
//!
//! - `POST /api/scf/search`      `{requirement_text, top_k, min_similarity}`
//! - `POST /api/scf/validate`    `{scf_reference}`
//! - `POST /api/scf/threat-risk` `{requirement_text}`
//!
//! Every call carries a fixed client-side timeout (10 seconds by default);
//! exceeding it yields `KnowledgeBaseError::Timeout`, any other transport or
//! non-2xx failure yields `KnowledgeBaseError::Service`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::config::KnowledgeBaseConfig;
use crate::ports::{
    ControlMatch, KnowledgeBase, KnowledgeBaseError, ThreatRisk, ValidationVerdict,
};

/// Configuration for the HTTP knowledge base client.
#[derive(Debug, Clone)]
pub struct HttpKnowledgeBaseConfig {
    /// Base URL of the SCF backend service.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Similarity threshold sent with every search.
    pub min_similarity: f64,
}

impl HttpKnowledgeBaseConfig {
    /// Creates a configuration with the default timeout and threshold.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
            min_similarity: 0.5,
        }
    }

    /// Builds a configuration from the application knowledge base config.
    pub fn from_app(config: &KnowledgeBaseConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            min_similarity: config.min_similarity,
        }
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the similarity threshold.
    pub fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }
}

/// HTTP client for the SCF knowledge base service.
pub struct HttpKnowledgeBase {
    config: HttpKnowledgeBaseConfig,
    client: Client,
}

impl HttpKnowledgeBase {
    /// Creates a new client with the given configuration.
    pub fn new(config: HttpKnowledgeBaseConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, KnowledgeBaseError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| self.translate_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KnowledgeBaseError::Service(format!(
                "HTTP {} from {}",
                status, path
            )));
        }

        response
            .json()
            .await
            .map_err(|e| KnowledgeBaseError::Service(format!("invalid response body: {}", e)))
    }

    fn translate_transport_error(&self, error: reqwest::Error) -> KnowledgeBaseError {
        if error.is_timeout() {
            KnowledgeBaseError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else {
            KnowledgeBaseError::Service(error.to_string())
        }
    }
}

#[async_trait]
impl KnowledgeBase for HttpKnowledgeBase {
    async fn search_controls(
        &self,
        requirement_text: &str,
        top_k: usize,
    ) -> Result<Vec<ControlMatch>, KnowledgeBaseError> {
        self.post_json(
            "/api/scf/search",
            &SearchRequest {
                requirement_text,
                top_k,
                min_similarity: self.config.min_similarity,
            },
        )
        .await
    }

    async fn validate_control(
        &self,
        scf_id: &str,
    ) -> Result<ValidationVerdict, KnowledgeBaseError> {
        self.post_json(
            "/api/scf/validate",
            &ValidateRequest {
                scf_reference: scf_id,
            },
        )
        .await
    }

    async fn find_threat_and_risk(
        &self,
        requirement_text: &str,
    ) -> Result<ThreatRisk, KnowledgeBaseError> {
        self.post_json("/api/scf/threat-risk", &ThreatRiskRequest { requirement_text })
            .await
    }
}

// ----- Wire types -----

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    requirement_text: &'a str,
    top_k: usize,
    min_similarity: f64,
}

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    scf_reference: &'a str,
}

#[derive(Debug, Serialize)]
struct ThreatRiskRequest<'a> {
    requirement_text: &'a str,
}
