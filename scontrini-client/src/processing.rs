//! Processing step board
//!
//! Progress surface for the intake pipeline: upload, OCR, parsing, save.
//! The extraction backend performs OCR and parsing in a single call, so the
//! board advances those two steps together when the response lands.

use shared::models::{ProcessingStep, StepId, StepStatus};

/// Tracks the four pipeline steps for one receipt.
///
/// The upload step is completed at construction: a board only exists once
/// the image is already stored.
#[derive(Debug, Clone)]
pub struct ProcessingBoard {
    steps: Vec<ProcessingStep>,
}

impl ProcessingBoard {
    pub fn new() -> Self {
        let mut board = Self {
            steps: vec![
                ProcessingStep::new(StepId::Upload),
                ProcessingStep::new(StepId::Ocr),
                ProcessingStep::new(StepId::Parsing),
                ProcessingStep::new(StepId::Save),
            ],
        };
        board.set_status(StepId::Upload, StepStatus::Completed);
        board
    }

    pub fn steps(&self) -> &[ProcessingStep] {
        &self.steps
    }

    pub fn status(&self, id: StepId) -> StepStatus {
        self.steps
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.status)
            .unwrap_or(StepStatus::Pending)
    }

    pub fn set_status(&mut self, id: StepId, status: StepStatus) {
        if let Some(step) = self.steps.iter_mut().find(|s| s.id == id) {
            step.status = status;
        }
    }

    /// Extraction request dispatched: OCR is underway
    pub fn extraction_started(&mut self) {
        self.set_status(StepId::Ocr, StepStatus::Processing);
    }

    /// Extraction response landed: OCR and parsing both done, save underway
    pub fn extraction_succeeded(&mut self) {
        self.set_status(StepId::Ocr, StepStatus::Completed);
        self.set_status(StepId::Parsing, StepStatus::Completed);
        self.set_status(StepId::Save, StepStatus::Processing);
    }

    /// Draft persisted on the backend
    pub fn saved(&mut self) {
        self.set_status(StepId::Save, StepStatus::Completed);
    }

    /// Mark the first unfinished step as failed
    pub fn fail_current(&mut self) {
        if let Some(step) = self
            .steps
            .iter_mut()
            .find(|s| s.status != StepStatus::Completed)
        {
            step.status = StepStatus::Error;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|s| s.status == StepStatus::Completed)
    }

    pub fn has_error(&self) -> bool {
        self.steps.iter().any(|s| s.status == StepStatus::Error)
    }
}

impl Default for ProcessingBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_precompleted() {
        let board = ProcessingBoard::new();
        assert_eq!(board.status(StepId::Upload), StepStatus::Completed);
        assert_eq!(board.status(StepId::Ocr), StepStatus::Pending);
        assert!(!board.is_complete());
    }

    #[test]
    fn test_happy_path_progression() {
        let mut board = ProcessingBoard::new();
        board.extraction_started();
        assert_eq!(board.status(StepId::Ocr), StepStatus::Processing);

        board.extraction_succeeded();
        assert_eq!(board.status(StepId::Parsing), StepStatus::Completed);
        assert_eq!(board.status(StepId::Save), StepStatus::Processing);
        assert!(!board.is_complete());

        board.saved();
        assert!(board.is_complete());
        assert!(!board.has_error());
    }

    #[test]
    fn test_failure_marks_first_unfinished_step() {
        let mut board = ProcessingBoard::new();
        board.extraction_started();
        board.fail_current();
        assert_eq!(board.status(StepId::Ocr), StepStatus::Error);
        assert!(board.has_error());

        // Failure after extraction lands on the save step
        let mut board = ProcessingBoard::new();
        board.extraction_started();
        board.extraction_succeeded();
        board.fail_current();
        assert_eq!(board.status(StepId::Save), StepStatus::Error);
    }
}
