//! Upload gate: local validation before any bytes leave the device
//!
//! A rejected image never touches the network; the storage collaborator is
//! only reached once the file has passed format and size checks.

use crate::{ReceiptStorage, UploadError};
use shared::models::StoredImageRef;

/// Maximum accepted image size: 10 MiB
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Accepted MIME types. `image/jpg` is non-standard but common enough in
/// the wild (Android pickers) that rejecting it would burn real users.
pub const SUPPORTED_MIME_TYPES: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "image/heic"];

/// An image selected for upload
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

impl ImageFile {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }

    /// Build an image file guessing the MIME type from the filename
    pub fn from_filename(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        Self {
            bytes,
            filename,
            content_type,
        }
    }
}

/// Validates images and hands them to the storage collaborator
pub struct UploadGate<S> {
    storage: S,
}

impl<S: ReceiptStorage> UploadGate<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Validate format and size. Declared MIME type is what counts; the
    /// gate does not sniff bytes.
    pub fn validate(image: &ImageFile) -> Result<(), UploadError> {
        let mime = image.content_type.to_ascii_lowercase();
        if !SUPPORTED_MIME_TYPES.contains(&mime.as_str()) {
            return Err(UploadError::InvalidFormat(image.content_type.clone()));
        }
        if image.bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if image.bytes.len() > MAX_IMAGE_SIZE {
            return Err(UploadError::TooLarge {
                size: image.bytes.len(),
                max: MAX_IMAGE_SIZE,
            });
        }
        Ok(())
    }

    /// Validate then upload, returning the stored reference
    pub async fn upload(
        &self,
        user_id: &str,
        image: ImageFile,
    ) -> Result<StoredImageRef, UploadError> {
        Self::validate(&image)?;

        let key = crate::storage::object_key(user_id, &image.filename);
        tracing::info!(key, size = image.bytes.len(), "uploading receipt image");

        let stored = self
            .storage
            .upload_image(&key, &image.content_type, image.bytes)
            .await?;

        tracing::info!(url = stored.url, "receipt image stored");
        Ok(stored)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BackendError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStorage {
        uploads: AtomicUsize,
    }

    impl CountingStorage {
        fn new() -> Self {
            Self {
                uploads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReceiptStorage for CountingStorage {
        async fn upload_image(
            &self,
            key: &str,
            _content_type: &str,
            _bytes: Vec<u8>,
        ) -> Result<StoredImageRef, UploadError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            Ok(StoredImageRef {
                url: format!("https://files.test/{key}"),
                path: key.to_string(),
            })
        }

        async fn remove_image(&self, _key: &str) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn jpeg(size: usize) -> ImageFile {
        ImageFile::new(vec![0u8; size], "receipt.jpg", "image/jpeg")
    }

    #[test]
    fn test_validate_accepts_supported_types() {
        for mime in SUPPORTED_MIME_TYPES {
            let image = ImageFile::new(vec![1, 2, 3], "r.img", mime);
            assert!(UploadGate::<CountingStorage>::validate(&image).is_ok());
        }
        // case-insensitive on the declared type
        let image = ImageFile::new(vec![1], "r.jpg", "IMAGE/JPEG");
        assert!(UploadGate::<CountingStorage>::validate(&image).is_ok());
    }

    #[test]
    fn test_validate_rejects_unsupported_type() {
        let image = ImageFile::new(vec![1], "r.gif", "image/gif");
        assert!(matches!(
            UploadGate::<CountingStorage>::validate(&image),
            Err(UploadError::InvalidFormat(_))
        ));

        let pdf = ImageFile::new(vec![1], "r.pdf", "application/pdf");
        assert!(UploadGate::<CountingStorage>::validate(&pdf).is_err());
    }

    #[test]
    fn test_validate_format_checked_before_size() {
        // An oversize GIF reports the format problem, not the size one
        let image = ImageFile::new(vec![0u8; MAX_IMAGE_SIZE + 1], "r.gif", "image/gif");
        assert!(matches!(
            UploadGate::<CountingStorage>::validate(&image),
            Err(UploadError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_validate_size_bounds() {
        assert!(UploadGate::<CountingStorage>::validate(&jpeg(MAX_IMAGE_SIZE)).is_ok());
        assert!(matches!(
            UploadGate::<CountingStorage>::validate(&jpeg(MAX_IMAGE_SIZE + 1)),
            Err(UploadError::TooLarge { .. })
        ));
        assert!(matches!(
            UploadGate::<CountingStorage>::validate(&jpeg(0)),
            Err(UploadError::Empty)
        ));
    }

    #[test]
    fn test_mime_guess_fallback() {
        let image = ImageFile::from_filename(vec![1], "photo.png");
        assert_eq!(image.content_type, "image/png");

        let unknown = ImageFile::from_filename(vec![1], "photo.bin");
        assert_eq!(unknown.content_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn test_rejected_image_never_reaches_storage() {
        let gate = UploadGate::new(CountingStorage::new());
        let result = gate
            .upload("user-1", ImageFile::new(vec![1], "r.gif", "image/gif"))
            .await;
        assert!(result.is_err());
        assert_eq!(gate.storage().uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upload_returns_stored_ref() {
        let gate = UploadGate::new(CountingStorage::new());
        let stored = gate.upload("user-1", jpeg(2 * 1024 * 1024)).await.unwrap();
        assert!(stored.path.starts_with("user-1/"));
        assert!(stored.url.contains(&stored.path));
        assert_eq!(gate.storage().uploads.load(Ordering::SeqCst), 1);
    }
}
