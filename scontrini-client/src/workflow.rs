//! Workflow controller
//!
//! Owns the single live receipt draft and drives it through
//! `Upload -> Processing -> Review -> Complete`. One collaborator call may
//! be outstanding at a time; a per-draft cancellation token lets the user
//! abandon a slow extraction without tearing down the controller.
//!
//! Failures land in a single error slot (what a UI banner would show),
//! replaced on each failure and cleared on each successful transition.
//! The typed error is also returned so callers can branch on it.

use crate::error::{BackendError, WorkflowError};
use crate::processing::ProcessingBoard;
use crate::review::ReviewReconciler;
use crate::upload::{ImageFile, UploadGate};
use crate::{ReceiptBackend, ReceiptStorage};
use shared::contracts::{
    CategorizeProductRequest, CategorizeProductResponse, ConfirmReceiptRequest,
    ProcessReceiptRequest,
};
use shared::models::StoredImageRef;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;

/// Workflow stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStep {
    Upload,
    Processing,
    Review,
    Complete,
}

impl std::fmt::Display for UploadStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UploadStep::Upload => "upload",
            UploadStep::Processing => "processing",
            UploadStep::Review => "review",
            UploadStep::Complete => "complete",
        };
        write!(f, "{name}")
    }
}

/// Clears the in-flight flag when dropped, so an abandoned call (the owning
/// future dropped at an await point) does not leave the controller busy.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives one receipt from photo to confirmed record
pub struct WorkflowController<B, S> {
    backend: B,
    gate: UploadGate<S>,
    user_id: String,
    household_id: String,
    stage: UploadStep,
    stored: Option<StoredImageRef>,
    board: ProcessingBoard,
    receipt_id: Option<String>,
    ocr_confidence: Option<f64>,
    reconciler: Option<ReviewReconciler>,
    error: Option<String>,
    in_flight: Arc<AtomicBool>,
    cancel: CancellationToken,
}

impl<B: ReceiptBackend, S: ReceiptStorage> WorkflowController<B, S> {
    pub fn new(
        backend: B,
        storage: S,
        user_id: impl Into<String>,
        household_id: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            gate: UploadGate::new(storage),
            user_id: user_id.into(),
            household_id: household_id.into(),
            stage: UploadStep::Upload,
            stored: None,
            board: ProcessingBoard::new(),
            receipt_id: None,
            ocr_confidence: None,
            reconciler: None,
            error: None,
            in_flight: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
        }
    }

    pub fn stage(&self) -> UploadStep {
        self.stage
    }

    /// The banner message from the last failure, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn steps(&self) -> &ProcessingBoard {
        &self.board
    }

    pub fn stored_image(&self) -> Option<&StoredImageRef> {
        self.stored.as_ref()
    }

    pub fn receipt_id(&self) -> Option<&str> {
        self.receipt_id.as_deref()
    }

    pub fn ocr_confidence(&self) -> Option<f64> {
        self.ocr_confidence
    }

    /// Token that aborts the in-flight extraction when cancelled. Cloneable,
    /// so a UI cancel button can hold it while the controller is borrowed.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn require_stage(&self, stage: UploadStep) -> Result<(), WorkflowError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(WorkflowError::WrongStage(self.stage))
        }
    }

    fn fail(&mut self, err: WorkflowError) -> WorkflowError {
        self.error = Some(err.to_string());
        err
    }

    fn reset_to_upload(&mut self) {
        self.stage = UploadStep::Upload;
        self.stored = None;
        self.board = ProcessingBoard::new();
        self.receipt_id = None;
        self.ocr_confidence = None;
        self.reconciler = None;
        self.error = None;
        self.in_flight.store(false, Ordering::SeqCst);
        self.cancel = CancellationToken::new();
    }

    /// Best-effort removal of an image that will never be processed
    async fn discard_stored_image(&mut self) {
        if let Some(stored) = self.stored.take() {
            if let Err(err) = self.gate.storage().remove_image(&stored.path).await {
                tracing::warn!(path = stored.path, error = %err, "failed to remove orphaned receipt image");
            }
        }
    }

    /// Validate and store the receipt photo. Success moves to Processing;
    /// a rejected or failed upload stays in Upload with the error slot set.
    pub async fn submit_image(&mut self, image: ImageFile) -> Result<&StoredImageRef, WorkflowError> {
        self.require_stage(UploadStep::Upload)?;

        match self.gate.upload(&self.user_id, image).await {
            Ok(stored) => {
                self.board = ProcessingBoard::new();
                self.stage = UploadStep::Processing;
                self.error = None;
                Ok(self.stored.insert(stored))
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Run the extraction call for the stored image. Single-flight: a second
    /// call while one is outstanding returns `Busy`; dropping an outstanding
    /// call releases the slot. Cancellation and failure both remove the
    /// now-orphaned stored image and return to Upload.
    pub async fn begin_processing(&mut self) -> Result<(), WorkflowError> {
        self.require_stage(UploadStep::Processing)?;
        let stored = self
            .stored
            .as_ref()
            .ok_or(WorkflowError::WrongStage(self.stage))?;

        let request = ProcessReceiptRequest {
            image_url: stored.url.clone(),
            household_id: self.household_id.clone(),
            uploaded_by: self.user_id.clone(),
        };
        let token = self.cancel.clone();

        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(WorkflowError::Busy);
        }
        let _in_flight = InFlightGuard(self.in_flight.clone());

        self.board.extraction_started();
        tracing::info!(image_url = request.image_url, "starting receipt extraction");

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = self.backend.process_receipt(&request) => Some(result),
        };

        let result = match outcome {
            None => {
                tracing::info!("extraction cancelled, discarding draft");
                self.discard_stored_image().await;
                self.reset_to_upload();
                return Err(WorkflowError::Cancelled);
            }
            Some(result) => result,
        };

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                self.board.fail_current();
                self.discard_stored_image().await;
                let err = self.fail(WorkflowError::Processing(err));
                self.stage = UploadStep::Upload;
                return Err(err);
            }
        };

        if !response.success {
            self.board.fail_current();
            self.discard_stored_image().await;
            let message = response
                .error
                .or(response.message)
                .unwrap_or_else(|| "Receipt processing failed".to_string());
            let err = self.fail(WorkflowError::Processing(BackendError::Remote(message)));
            self.stage = UploadStep::Upload;
            return Err(err);
        }

        let (receipt_id, draft) = match (response.receipt_id, response.parsed_data) {
            (Some(id), Some(draft)) => (id, draft),
            _ => {
                self.board.fail_current();
                self.discard_stored_image().await;
                let err = self.fail(WorkflowError::Processing(BackendError::MalformedResponse(
                    "success response without receipt_id or parsed_data".to_string(),
                )));
                self.stage = UploadStep::Upload;
                return Err(err);
            }
        };

        self.board.extraction_succeeded();
        self.board.saved();
        tracing::info!(receipt_id, items = draft.items.len(), "draft ready for review");

        self.receipt_id = Some(receipt_id);
        self.ocr_confidence = response.ocr_confidence;
        self.reconciler = Some(ReviewReconciler::new(draft));
        self.stage = UploadStep::Review;
        self.error = None;
        Ok(())
    }

    /// The reconciler, available during Review
    pub fn reconciler(&self) -> Result<&ReviewReconciler, WorkflowError> {
        self.require_stage(UploadStep::Review)?;
        self.reconciler
            .as_ref()
            .ok_or(WorkflowError::WrongStage(self.stage))
    }

    pub fn reconciler_mut(&mut self) -> Result<&mut ReviewReconciler, WorkflowError> {
        self.require_stage(UploadStep::Review)?;
        let stage = self.stage;
        self.reconciler
            .as_mut()
            .ok_or(WorkflowError::WrongStage(stage))
    }

    /// Ask the backend for a category suggestion for one line item, using
    /// its current (possibly edited) identity fields.
    pub async fn suggest_category(
        &self,
        index: usize,
    ) -> Result<CategorizeProductResponse, WorkflowError> {
        let reconciler = self.reconciler()?;
        let item = reconciler
            .items()
            .get(index)
            .ok_or(WorkflowError::Reconcile(
                crate::error::ReconcileError::IndexOutOfRange(index),
            ))?;

        let request = CategorizeProductRequest {
            canonical_name: item
                .canonical_name
                .clone()
                .unwrap_or_else(|| item.raw_product_name.clone()),
            brand: item.brand.clone(),
            size: item.size.clone(),
            unit_type: item.unit_type.clone(),
        };

        self.backend
            .categorize_product(&request)
            .await
            .map_err(WorkflowError::Categorize)
    }

    /// Submit the reviewed draft. Success is terminal; a collaborator
    /// failure keeps the draft in Review so the user can retry.
    pub async fn confirm(&mut self) -> Result<(), WorkflowError> {
        self.require_stage(UploadStep::Review)?;
        let reconciler = self
            .reconciler
            .as_ref()
            .ok_or(WorkflowError::WrongStage(self.stage))?;
        let modified_products = reconciler.confirm_all().map_err(WorkflowError::from)?;
        let receipt_id = self
            .receipt_id
            .clone()
            .ok_or(WorkflowError::WrongStage(self.stage))?;

        let request = ConfirmReceiptRequest {
            receipt_id,
            modified_products,
        };
        tracing::info!(
            receipt_id = request.receipt_id,
            modified = request.modified_products.len(),
            "confirming receipt"
        );

        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(WorkflowError::Busy);
        }
        let _in_flight = InFlightGuard(self.in_flight.clone());
        let result = self.backend.confirm_receipt(&request).await;

        let response = match result {
            Ok(response) => response,
            Err(err) => return Err(self.fail(WorkflowError::Persistence(err))),
        };
        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "Failed to save receipt".to_string());
            return Err(self.fail(WorkflowError::Persistence(BackendError::Remote(message))));
        }

        if let Some(reconciler) = self.reconciler.as_mut() {
            reconciler.mark_confirmed();
        }
        self.stage = UploadStep::Complete;
        self.error = None;
        Ok(())
    }

    /// Abandon the current draft from Processing or Review and return to
    /// Upload. Any in-flight extraction is cancelled via the token.
    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        match self.stage {
            UploadStep::Processing | UploadStep::Review => {
                self.cancel.cancel();
                self.reset_to_upload();
                Ok(())
            }
            stage => Err(WorkflowError::WrongStage(stage)),
        }
    }
}
