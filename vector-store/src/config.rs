//! Connection and collection configuration.

use std::time::Duration;

use crate::errors::VectorStoreError;

/// Configuration for the passage collection.
#[derive(Clone, Debug)]
pub struct VectorStoreConfig {
    /// Qdrant HTTP endpoint, e.g. `http://localhost:6334`.
    pub url: String,
    /// Optional API key for Qdrant Cloud.
    pub api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl VectorStoreConfig {
    pub fn new(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            collection: collection.into(),
            timeout: Duration::from_secs(8),
        }
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), VectorStoreError> {
        if self.url.trim().is_empty() {
            return Err(VectorStoreError::Config("url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(VectorStoreError::Config("collection is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_fields() {
        let cfg = VectorStoreConfig::new("", "textbook_chunks");
        assert!(cfg.validate().is_err());

        let cfg = VectorStoreConfig::new("http://localhost:6334", "  ");
        assert!(cfg.validate().is_err());

        let cfg = VectorStoreConfig::new("http://localhost:6334", "textbook_chunks");
        assert!(cfg.validate().is_ok());
    }
}
