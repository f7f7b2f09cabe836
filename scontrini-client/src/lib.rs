//! Scontrini Client - receipt intake workflow
//!
//! Drives one receipt from an uploaded photo through OCR/AI extraction to a
//! confirmed, persisted receipt: Upload -> Processing -> Review -> Complete.
//! OCR, normalization, auth and persistence live behind HTTP collaborators;
//! this crate owns the stage sequencing and the review reconciliation.

pub mod backend;
pub mod config;
pub mod error;
pub mod household;
pub mod processing;
pub mod review;
pub mod storage;
pub mod upload;
pub mod workflow;

pub use backend::{HttpBackend, ReceiptBackend};
pub use config::{ClientConfig, StorageConfig};
pub use error::{BackendError, ReconcileError, UploadError, WorkflowError};
pub use household::ensure_household;
pub use processing::ProcessingBoard;
pub use review::{EditSession, ItemReviewState, ReconcilerState, ReviewReconciler};
pub use storage::{HttpStorage, ReceiptStorage};
pub use upload::{ImageFile, UploadGate};
pub use workflow::{UploadStep, WorkflowController};

// Re-export shared types for convenience
pub use shared::contracts::{ChangedItem, ProcessReceiptResponse};
pub use shared::models::{Household, LineItem, ReceiptDraft, StoredImageRef};
