//! Object storage client for receipt images
//!
//! Uploads validated image bytes to the storage collaborator and returns a
//! public URL the extraction backend can fetch. Keys are namespaced per
//! user so one household member cannot clobber another's uploads.

use crate::{BackendError, StorageConfig, UploadError};
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use shared::models::StoredImageRef;

/// Storage collaborator seam
#[async_trait]
pub trait ReceiptStorage: Send + Sync {
    /// Upload image bytes under the given key; returns the public reference
    async fn upload_image(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredImageRef, UploadError>;

    /// Remove a previously uploaded object (cleanup after downstream failure)
    async fn remove_image(&self, key: &str) -> Result<(), BackendError>;
}

/// Build a collision-resistant object key: `{user}/{millis}-{random}.{ext}`.
///
/// The extension is taken from the original filename, defaulting to `jpg`
/// when the name carries none.
pub fn object_key(user_id: &str, filename: &str) -> String {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "jpg".to_string());
    let millis = chrono::Utc::now().timestamp_millis();
    let random: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{user_id}/{millis}-{random:06}.{ext}")
}

/// HTTP implementation against a Supabase-style storage API
#[derive(Debug, Clone)]
pub struct HttpStorage {
    client: Client,
    config: StorageConfig,
}

impl HttpStorage {
    pub fn new(config: StorageConfig, timeout: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self { client, config }
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/object/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.bucket,
            key
        )
    }

    /// Public (unauthenticated) URL the extraction backend fetches from
    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/object/public/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.bucket,
            key
        )
    }
}

#[async_trait]
impl ReceiptStorage for HttpStorage {
    async fn upload_image(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredImageRef, UploadError> {
        let response = self
            .client
            .post(self.object_url(key))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| UploadError::StorageUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(%status, "image upload rejected by storage");
            return Err(UploadError::StorageUnavailable(if text.is_empty() {
                format!("HTTP {status}")
            } else {
                text
            }));
        }

        Ok(StoredImageRef {
            url: self.public_url(key),
            path: key.to_string(),
        })
    }

    async fn remove_image(&self, key: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.object_url(key))
            .send()
            .await
            .map_err(BackendError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Remote(format!("HTTP {status}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_shape() {
        let key = object_key("user-1", "receipt.JPG");
        assert!(key.starts_with("user-1/"));
        assert!(key.ends_with(".jpg"));

        let parts: Vec<&str> = key.split('/').collect();
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn test_object_key_extension_fallback() {
        let key = object_key("user-1", "noextension");
        assert!(key.ends_with(".jpg"));

        let key = object_key("user-1", "trailing.");
        assert!(key.ends_with(".jpg"));
    }

    #[test]
    fn test_urls() {
        let storage = HttpStorage::new(
            StorageConfig::new("https://x.supabase.co/storage/v1").with_bucket("receipts"),
            60,
        );
        assert_eq!(
            storage.object_url("u/1.jpg"),
            "https://x.supabase.co/storage/v1/object/receipts/u/1.jpg"
        );
        assert_eq!(
            storage.public_url("u/1.jpg"),
            "https://x.supabase.co/storage/v1/object/public/receipts/u/1.jpg"
        );
    }
}
