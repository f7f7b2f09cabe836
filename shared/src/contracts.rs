//! Wire contracts for the backend collaborators
//!
//! Request/response shapes for every external call the workflow makes.
//! The extraction backend speaks snake_case; the household proxy routes
//! keep the camelCase keys of the original API surface. These are validated
//! at the boundary before anything downstream trusts them.

use crate::models::{Household, ReceiptDraft};
use serde::{Deserialize, Serialize};

// ============================================================================
// Household
// ============================================================================

/// `POST /api/household/check`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdCheckRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdCheckResponse {
    pub has_household: bool,
    #[serde(default)]
    pub household: Option<Household>,
}

/// `POST /api/household/create`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdCreateRequest {
    pub user_id: String,
    pub household_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdCreateResponse {
    pub success: bool,
    #[serde(default)]
    pub household: Option<Household>,
}

// ============================================================================
// Receipt processing
// ============================================================================

/// `POST /api/v1/receipts/process`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessReceiptRequest {
    pub image_url: String,
    pub household_id: String,
    pub uploaded_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessReceiptResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_data: Option<ReceiptDraft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================================================
// Receipt confirmation
// ============================================================================

/// One user-modified line item reported back on confirm.
///
/// Carries the reconciliation ID plus every user-mutable field; an item is
/// included if and only if at least one compared field differs from the
/// original snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
    pub quantity: f64,
    pub total_price: f64,
    pub user_verified: bool,
}

/// `POST /api/v1/receipts/confirm`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmReceiptRequest {
    pub receipt_id: String,
    pub modified_products: Vec<ChangedItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmReceiptResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================================================
// Product categorization
// ============================================================================

/// `POST /api/v1/products/categorize`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizeProductRequest {
    pub canonical_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizeProductResponse {
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

// ============================================================================
// Error body
// ============================================================================

/// Non-2xx responses carry `{ error }` or `{ detail }`; surfaced verbatim
/// when no more specific local error applies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ApiErrorBody {
    /// The collaborator-supplied message, if any
    pub fn message(&self) -> Option<&str> {
        self.error.as_deref().or(self.detail.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_response_deserialize() {
        let json = r#"{
            "success": true,
            "receipt_id": "rcpt-42",
            "parsed_data": {
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
            },
            "ocr_confidence": 0.92
        }"#;
        let resp: ProcessReceiptResponse = serde_json::from_str(json).unwrap();
        assert!(resp.success);
        assert_eq!(resp.receipt_id.as_deref(), Some("rcpt-42"));
        let parsed = resp.parsed_data.unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(resp.ocr_confidence, Some(0.92));
    }

    #[test]
    fn test_process_response_declared_failure() {
        let json = r#"{"success": false, "error": "OCR failed on image"}"#;
        let resp: ProcessReceiptResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("OCR failed on image"));
        assert!(resp.parsed_data.is_none());
    }

    #[test]
    fn test_household_check_camel_case() {
        let req = HouseholdCheckRequest {
            user_id: "user-1".into(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"userId":"user-1"}"#);

        let resp: HouseholdCheckResponse =
            serde_json::from_str(r#"{"hasHousehold":false,"household":null}"#).unwrap();
        assert!(!resp.has_household);
        assert!(resp.household.is_none());
    }

    #[test]
    fn test_confirm_request_serialize() {
        let req = ConfirmReceiptRequest {
            receipt_id: "rcpt-42".into(),
            modified_products: vec![],
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains(r#""receipt_id":"rcpt-42""#));
        assert!(json.contains(r#""modified_products":[]"#));
    }

    #[test]
    fn test_api_error_body_precedence() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error":"boom","detail":"ignored"}"#).unwrap();
        assert_eq!(body.message(), Some("boom"));

        let body: ApiErrorBody = serde_json::from_str(r#"{"detail":"fastapi style"}"#).unwrap();
        assert_eq!(body.message(), Some("fastapi style"));

        let body: ApiErrorBody = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(body.message(), None);
    }
}
