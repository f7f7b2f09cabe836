//! Workflow error types
//!
//! Every failure surfaces to the controller's single error slot; nothing is
//! swallowed and nothing retries automatically. Local validation errors
//! never reach the network; collaborator errors carry the collaborator's
//! message when one was supplied.

use crate::workflow::UploadStep;
use thiserror::Error;

/// Upload Gate errors (local validation plus the storage collaborator)
#[derive(Debug, Error)]
pub enum UploadError {
    /// Declared MIME type outside the supported set
    #[error("Unsupported image format '{0}'. Use JPG, PNG or HEIC")]
    InvalidFormat(String),

    /// Image exceeds the size limit
    #[error("Image too large: {size} bytes (maximum {max})")]
    TooLarge { size: usize, max: usize },

    /// Empty payload
    #[error("Empty image file")]
    Empty,

    /// Storage collaborator failed; carries its message
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

/// Errors talking to an HTTP collaborator
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Transport-level failure (connection, TLS, ...)
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Collaborator answered but the payload didn't match the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Collaborator declared a failure; message surfaced verbatim
    #[error("{0}")]
    Remote(String),
}

impl BackendError {
    /// Map a reqwest error, distinguishing timeout expiry from transport loss
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else {
            BackendError::Transport(err)
        }
    }
}

/// Review Reconciler misuse and edit validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ReconcileError {
    /// An edit session is already open (single-writer discipline)
    #[error("Another edit is already in progress")]
    EditInProgress,

    /// No edit session is open
    #[error("No edit in progress")]
    NoSession,

    /// Line item index outside the draft
    #[error("No line item at index {0}")]
    IndexOutOfRange(usize),

    /// Negative quantity/price rejected at the edit-apply boundary
    #[error("{field} must be non-negative, got {value}")]
    InvalidValue { field: &'static str, value: f64 },
}

/// Top-level workflow error, one per failed operation
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Extraction collaborator failed during the Processing stage
    #[error("Processing failed: {0}")]
    Processing(#[source] BackendError),

    /// Confirm call failed; the draft stays in Review
    #[error("Failed to save receipt: {0}")]
    Persistence(#[source] BackendError),

    /// Ad-hoc categorization call failed
    #[error("Categorization failed: {0}")]
    Categorize(#[source] BackendError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// A collaborator call for this draft is already outstanding
    #[error("An operation is already in flight for this receipt")]
    Busy,

    /// Operation not valid in the current stage
    #[error("Operation not allowed in the {0} stage")]
    WrongStage(UploadStep),

    /// The draft was cancelled while a request was in flight
    #[error("Receipt intake was cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_error_display() {
        let err = UploadError::InvalidFormat("image/gif".into());
        assert_eq!(
            err.to_string(),
            "Unsupported image format 'image/gif'. Use JPG, PNG or HEIC"
        );

        let err = UploadError::TooLarge {
            size: 11 * 1024 * 1024,
            max: 10 * 1024 * 1024,
        };
        assert!(err.to_string().contains("maximum 10485760"));
    }

    #[test]
    fn test_remote_message_surfaced_verbatim() {
        let err = BackendError::Remote("OCR failed on image".into());
        assert_eq!(err.to_string(), "OCR failed on image");

        let wrapped = WorkflowError::Processing(err);
        assert_eq!(wrapped.to_string(), "Processing failed: OCR failed on image");
    }

    #[test]
    fn test_reconcile_error_eq() {
        assert_eq!(ReconcileError::EditInProgress, ReconcileError::EditInProgress);
        assert_ne!(
            ReconcileError::EditInProgress,
            ReconcileError::IndexOutOfRange(0)
        );
    }
}
