//! HTTP client for the extraction backend
//!
//! Provides network-based calls to the receipt processing API. The trait
//! seam exists so the workflow controller can be exercised against mock
//! collaborators in tests.

use crate::{BackendError, ClientConfig};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::contracts::{
    ApiErrorBody, CategorizeProductRequest, CategorizeProductResponse, ConfirmReceiptRequest,
    ConfirmReceiptResponse, HouseholdCheckRequest, HouseholdCheckResponse, HouseholdCreateRequest,
    HouseholdCreateResponse, ProcessReceiptRequest, ProcessReceiptResponse,
};

/// Backend collaborator seam for the receipt workflow.
///
/// Implementations return the wire response as-is; interpreting a declared
/// failure (`success: false`) is the caller's job.
#[async_trait]
pub trait ReceiptBackend: Send + Sync {
    /// Submit a stored image for OCR + parsing + normalization
    async fn process_receipt(
        &self,
        request: &ProcessReceiptRequest,
    ) -> Result<ProcessReceiptResponse, BackendError>;

    /// Confirm a reviewed receipt, reporting user modifications
    async fn confirm_receipt(
        &self,
        request: &ConfirmReceiptRequest,
    ) -> Result<ConfirmReceiptResponse, BackendError>;

    /// Categorize a single product on demand
    async fn categorize_product(
        &self,
        request: &CategorizeProductRequest,
    ) -> Result<CategorizeProductResponse, BackendError>;

    /// Check whether a user already belongs to a household
    async fn check_household(
        &self,
        request: &HouseholdCheckRequest,
    ) -> Result<HouseholdCheckResponse, BackendError>;

    /// Create a household and enroll the user
    async fn create_household(
        &self,
        request: &HouseholdCreateRequest,
    ) -> Result<HouseholdCreateResponse, BackendError>;
}

/// HTTP implementation talking to the real backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a new backend client from configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        }
    }

    /// Make a POST request with JSON body
    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(BackendError::from_reqwest)?;

        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.map_err(BackendError::from_reqwest)?;
            let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();
            let message = body
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(BackendError::Remote(message));
        }

        let text = response.text().await.map_err(BackendError::from_reqwest)?;
        serde_json::from_str(&text).map_err(|e| BackendError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl ReceiptBackend for HttpBackend {
    async fn process_receipt(
        &self,
        request: &ProcessReceiptRequest,
    ) -> Result<ProcessReceiptResponse, BackendError> {
        self.post("/api/v1/receipts/process", request).await
    }

    async fn confirm_receipt(
        &self,
        request: &ConfirmReceiptRequest,
    ) -> Result<ConfirmReceiptResponse, BackendError> {
        self.post("/api/v1/receipts/confirm", request).await
    }

    async fn categorize_product(
        &self,
        request: &CategorizeProductRequest,
    ) -> Result<CategorizeProductResponse, BackendError> {
        self.post("/api/v1/products/categorize", request).await
    }

    async fn check_household(
        &self,
        request: &HouseholdCheckRequest,
    ) -> Result<HouseholdCheckResponse, BackendError> {
        self.post("/api/household/check", request).await
    }

    async fn create_household(
        &self,
        request: &HouseholdCreateRequest,
    ) -> Result<HouseholdCreateResponse, BackendError> {
        self.post("/api/household/create", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let backend = HttpBackend::new(&ClientConfig::new("http://localhost:8000/"));
        assert_eq!(backend.base_url, "http://localhost:8000");
    }
}
