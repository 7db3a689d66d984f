//! Knowledge base (SCF backend) configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration for the external SCF knowledge base service
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// Base URL of the SCF backend service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Number of control candidates requested per semantic search
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum similarity score for a control candidate to be returned
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,
}

impl KnowledgeBaseConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate knowledge base configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::InvalidKnowledgeBaseUrl);
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidKnowledgeBaseUrl);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(ValidationError::InvalidSimilarityThreshold);
        }
        Ok(())
    }
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            top_k: default_top_k(),
            min_similarity: default_min_similarity(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_top_k() -> usize {
    5
}

fn default_min_similarity() -> f64 {
    0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KnowledgeBaseConfig::default();
        assert_eq!(config.base_url, "http://localhost:8001");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.top_k, 5);
        assert_eq!(config.min_similarity, 0.5);
    }

    #[test]
    fn test_validation_valid_defaults() {
        assert!(KnowledgeBaseConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_url() {
        let config = KnowledgeBaseConfig {
            base_url: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidKnowledgeBaseUrl)
        ));
    }

    #[test]
    fn test_validation_rejects_non_http_url() {
        let config = KnowledgeBaseConfig {
            base_url: "ftp://scf.internal".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_out_of_range_similarity() {
        let config = KnowledgeBaseConfig {
            min_similarity: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidSimilarityThreshold)
        ));
    }
}
