//! Receipt Models
//!
//! The working representation of one in-flight receipt: the draft populated
//! by the extraction backend, its line items, and the observational
//! processing-progress steps. None of this is persisted client-side; the
//! draft lives exactly as long as one intake session.

use serde::{Deserialize, Serialize};

/// Stable reference to an uploaded receipt image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImageRef {
    /// Publicly dereferenceable URL
    pub url: String,
    /// Storage path (bucket-relative), used for later deletion
    pub path: String,
}

/// One product entry on the receipt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Opaque ID used for reconciliation against the persisted original
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_item_id: Option<String>,
    /// Verbatim OCR text, immutable provenance field
    pub raw_product_name: String,
    /// Reference to the normalized product record, when one matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_product_id: Option<String>,
    /// Normalized, brand/size-aware product name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Format descriptor, e.g. "1.5" with unit_type "L"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
    pub quantity: f64,
    /// Price per unit in currency units
    pub unit_price: f64,
    /// Line total in currency units
    pub total_price: f64,
    /// Normalization confidence assigned by the extraction backend (0.0-1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// True when confidence fell below the acceptance threshold
    #[serde(default)]
    pub pending_review: bool,
    /// Set true only by an explicit user accept/save action
    #[serde(default)]
    pub user_verified: bool,
    /// True when normalization was served from a prior lookup
    #[serde(default)]
    pub from_cache: bool,
}

/// The working, mutable representation of one in-flight receipt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptDraft {
    // Store info
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_address: Option<String>,

    // Receipt info
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_time: Option<String>,
    /// Total amount in currency units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    /// Tax amount in currency units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<f64>,
    /// Discount amount in currency units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,

    /// Line items in display order (order is not semantically significant)
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// Identifier of one processing sub-stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Upload,
    Ocr,
    Parsing,
    Save,
}

/// Status of one processing sub-stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Error,
}

/// One stage in the processing progress display; never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStep {
    pub id: StepId,
    pub status: StepStatus,
}

impl ProcessingStep {
    pub fn new(id: StepId) -> Self {
        Self {
            id,
            status: StepStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_deserialize_minimal() {
        // The extraction backend may omit every normalization field
        let json = r#"{
            "raw_product_name": "LATTE PARMALAT 1L",
            "quantity": 1,
            "unit_price": 1.50,
            "total_price": 1.50
        }"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.raw_product_name, "LATTE PARMALAT 1L");
        assert_eq!(item.quantity, 1.0);
        assert!(item.canonical_name.is_none());
        assert!(!item.pending_review);
        assert!(!item.user_verified);
        assert!(!item.from_cache);
    }

    #[test]
    fn test_receipt_draft_deserialize() {
        let json = r#"{
            "store_name": "Esselunga",
            "total_amount": 12.50,
            "items": [{
                "raw_product_name": "LATTE PARMALAT 1L",
                "quantity": 1,
                "unit_price": 1.50,
                "total_price": 1.50,
                "confidence": 0.4,
                "pending_review": true
            }]
        }"#;
        let draft: ReceiptDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.store_name.as_deref(), Some("Esselunga"));
        assert_eq!(draft.total_amount, Some(12.50));
        assert_eq!(draft.items.len(), 1);
        assert!(draft.items[0].pending_review);
        assert_eq!(draft.items[0].confidence, Some(0.4));
    }

    #[test]
    fn test_step_status_serde() {
        let json = serde_json::to_string(&StepStatus::Processing).unwrap();
        assert_eq!(json, r#""processing""#);
        let status: StepStatus = serde_json::from_str(r#""error""#).unwrap();
        assert_eq!(status, StepStatus::Error);
    }
}
