//! Client configuration
//!
//! Explicitly constructed and passed into each component that needs it;
//! nothing in this crate reads process-wide mutable state.

/// Default request timeout: the extraction call regularly takes tens of
/// seconds (OCR + LLM), so collaborator SLA plus margin.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default storage bucket for receipt images
pub const DEFAULT_BUCKET: &str = "scontrini-receipts";

/// Object storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage API endpoint (e.g. "https://xyz.supabase.co/storage/v1")
    pub endpoint: String,
    /// Bucket holding receipt images
    pub bucket: String,
}

impl StorageConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }
}

/// Configuration for the workflow's backend collaborators
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Extraction backend base URL (e.g. "http://localhost:8000")
    pub backend_url: String,
    /// Object storage collaborator
    pub storage: StorageConfig,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    /// Create a new configuration for the given backend URL
    pub fn new(backend_url: impl Into<String>) -> Self {
        let backend_url: String = backend_url.into();
        Self {
            storage: StorageConfig::new(format!("{}/storage/v1", backend_url.trim_end_matches('/'))),
            backend_url,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the storage collaborator configuration
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.storage.bucket, DEFAULT_BUCKET);
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("https://api.example.com")
            .with_timeout(90)
            .with_storage(StorageConfig::new("https://files.example.com").with_bucket("receipts"));
        assert_eq!(config.timeout, 90);
        assert_eq!(config.storage.endpoint, "https://files.example.com");
        assert_eq!(config.storage.bucket, "receipts");
    }
}
