//! Domain models

pub mod household;
pub mod receipt;

pub use household::Household;
pub use receipt::{
    LineItem, ProcessingStep, ReceiptDraft, StepId, StepStatus, StoredImageRef,
};
