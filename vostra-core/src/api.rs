//! Contract between the front-end and the invoice backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{ExtractedInvoice, Invoice, InvoiceList, InvoiceStatus};

/// Query for `GET /api/invoices`. Unset fields are left to backend defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListInvoicesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
}

impl ListInvoicesParams {
    /// Query pairs in the order the backend documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        pairs
    }
}

/// Body of `POST /api/invoices/{id}/approve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub validated_data: ExtractedInvoice,
}

/// A file chosen for upload. Validate with [`crate::upload::validate_upload`]
/// before handing it to an [`InvoiceApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Opaque liveness payload reported by the backend.
pub type HealthStatus = Value;

/// The six invoice operations the front-end performs.
///
/// Implementations never retry and report every failure as an [`ApiError`]
/// whose message can be shown to the user as-is.
#[async_trait]
pub trait InvoiceApi: Send + Sync {
    async fn upload(&self, file: UploadFile) -> Result<Invoice, ApiError>;

    /// 404 is reported as [`ApiError::NotFound`].
    async fn get_invoice(&self, id: i64) -> Result<Invoice, ApiError>;

    async fn list_invoices(&self, params: &ListInvoicesParams) -> Result<InvoiceList, ApiError>;

    /// The backend decides whether the invoice is in an approvable state.
    async fn approve_invoice(
        &self,
        id: i64,
        request: &ApprovalRequest,
    ) -> Result<Invoice, ApiError>;

    /// 404 is reported as [`ApiError::NotFound`], not swallowed.
    async fn delete_invoice(&self, id: i64) -> Result<(), ApiError>;

    async fn health_check(&self) -> Result<HealthStatus, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_skip_unset_fields() {
        assert!(ListInvoicesParams::default().query_pairs().is_empty());

        let params = ListInvoicesParams {
            skip: Some(0),
            limit: Some(2),
            status: Some(InvoiceStatus::ExtractionFailed),
        };
        assert_eq!(
            params.query_pairs(),
            vec![
                ("skip", "0".to_string()),
                ("limit", "2".to_string()),
                ("status", "extraction_failed".to_string()),
            ]
        );
    }
}
