//! In-memory invoice backend used in demo mode and behind test servers.
//!
//! Mirrors the real backend's observable behaviour: uploads are extracted
//! immediately with a canned result, only `extracted` invoices can be
//! approved, and listings are newest first.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::RwLock;
use vostra_core::api::{ApprovalRequest, HealthStatus, ListInvoicesParams, UploadFile};
use vostra_core::models::{AiSuggestion, ExtractedInvoice, Invoice, InvoiceList, InvoiceStatus, LineItem};
use vostra_core::upload::{sanitize_file_name, validate_upload};
use vostra_core::{ApiError, InvoiceApi};

const SEED_INVOICES: &str = include_str!("../../demo/invoices.json");

/// Page size used when a listing does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug)]
struct Inner {
    invoices: BTreeMap<i64, Invoice>,
    next_id: i64,
}

#[derive(Debug)]
pub struct DemoInvoiceStore {
    inner: RwLock<Inner>,
    max_upload_bytes: usize,
}

impl DemoInvoiceStore {
    /// An empty store.
    pub fn new(max_upload_bytes: usize) -> Self {
        Self::with_invoices(Vec::new(), max_upload_bytes)
    }

    /// A store holding the bundled sample invoices.
    pub fn seeded(max_upload_bytes: usize) -> Result<Self, serde_json::Error> {
        let invoices: Vec<Invoice> = serde_json::from_str(SEED_INVOICES)?;
        Ok(Self::with_invoices(invoices, max_upload_bytes))
    }

    pub fn with_invoices(invoices: Vec<Invoice>, max_upload_bytes: usize) -> Self {
        let next_id = invoices.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        Self {
            inner: RwLock::new(Inner {
                invoices: invoices.into_iter().map(|i| (i.id, i)).collect(),
                next_id,
            }),
            max_upload_bytes,
        }
    }
}

#[async_trait]
impl InvoiceApi for DemoInvoiceStore {
    async fn upload(&self, file: UploadFile) -> Result<Invoice, ApiError> {
        if let Err(err) = validate_upload(&file, self.max_upload_bytes) {
            return Err(ApiError::server(400, err.message()));
        }

        let file_name = sanitize_file_name(&file.file_name);
        let file_type = Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        let now = Utc::now();

        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let invoice = Invoice {
            id,
            status: InvoiceStatus::Extracted,
            original_filename: file_name,
            file_type,
            file_size: i64::try_from(file.size()).ok(),
            created_at: Some(now),
            updated_at: Some(now),
            extracted_at: Some(now),
            approved_at: None,
            error_message: None,
            raw_ai_data: Some(canned_extraction()),
            user_validated_data: None,
        };
        inner.invoices.insert(id, invoice.clone());

        tracing::info!(invoice_id = id, size = file.size(), "Demo invoice stored");
        Ok(invoice)
    }

    async fn get_invoice(&self, id: i64) -> Result<Invoice, ApiError> {
        self.inner
            .read()
            .await
            .invoices
            .get(&id)
            .cloned()
            .ok_or_else(ApiError::not_found)
    }

    async fn list_invoices(&self, params: &ListInvoicesParams) -> Result<InvoiceList, ApiError> {
        let inner = self.inner.read().await;
        let matching: Vec<&Invoice> = inner
            .invoices
            .values()
            .rev()
            .filter(|i| params.status.map_or(true, |status| i.status == status))
            .collect();

        let total = matching.len() as u64;
        let invoices = matching
            .into_iter()
            .skip(params.skip.unwrap_or(0) as usize)
            .take(params.limit.unwrap_or(DEFAULT_PAGE_SIZE) as usize)
            .cloned()
            .collect();

        Ok(InvoiceList { invoices, total })
    }

    async fn approve_invoice(
        &self,
        id: i64,
        request: &ApprovalRequest,
    ) -> Result<Invoice, ApiError> {
        let mut inner = self.inner.write().await;
        let invoice = inner.invoices.get_mut(&id).ok_or_else(ApiError::not_found)?;

        if !invoice.status.is_approvable() {
            return Err(ApiError::server(
                409,
                format!(
                    "Fakturan kan inte godkännas i status \"{}\".",
                    invoice.status.label()
                ),
            ));
        }

        let now = Utc::now();
        invoice.status = InvoiceStatus::Approved;
        invoice.user_validated_data = Some(request.validated_data.clone());
        invoice.approved_at = Some(now);
        invoice.updated_at = Some(now);

        tracing::info!(invoice_id = id, "Demo invoice approved");
        Ok(invoice.clone())
    }

    async fn delete_invoice(&self, id: i64) -> Result<(), ApiError> {
        self.inner
            .write()
            .await
            .invoices
            .remove(&id)
            .map(|_| ())
            .ok_or_else(ApiError::not_found)
    }

    async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        Ok(serde_json::json!({ "status": "healthy", "mode": "demo" }))
    }
}

fn suggestion(account_number: &str, account_name: &str, confidence: f64, explanation: &str) -> AiSuggestion {
    AiSuggestion {
        account_number: account_number.to_string(),
        account_name: account_name.to_string(),
        confidence,
        explanation: explanation.to_string(),
        xai: None,
    }
}

/// What the demo "extractor" returns for every upload.
fn canned_extraction() -> ExtractedInvoice {
    let amount = Decimal::from(4800);
    let vat_amount = Decimal::from(1200);
    ExtractedInvoice {
        invoice_date: Some(Utc::now().date_naive().to_string()),
        lines: vec![LineItem {
            line_number: 1,
            description: "Konsulttjänster enligt avtal".to_string(),
            period: None,
            quantity: Some(Decimal::from(4)),
            unit: Some("timmar".to_string()),
            unit_price: Some(Decimal::from(1200)),
            amount,
            vat_rate: Decimal::from(25),
            vat_amount,
            ai_suggestions: vec![
                suggestion("6550", "Konsultarvoden", 0.87, "Konsulttjänster bokförs normalt på 6550"),
                suggestion("6990", "Övriga externa kostnader", 0.52, "Generell kategori för externa tjänster"),
            ],
            user_account: None,
            approved: false,
        }],
        subtotal: Some(amount),
        vat_amount: Some(vat_amount),
        total: Some(amount + vat_amount),
        currency: Some("SEK".to_string()),
        ..ExtractedInvoice::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vostra_core::upload::DEFAULT_MAX_UPLOAD_BYTES;

    fn store() -> DemoInvoiceStore {
        DemoInvoiceStore::seeded(DEFAULT_MAX_UPLOAD_BYTES).unwrap()
    }

    fn pdf(name: &str) -> UploadFile {
        UploadFile::new(name, "application/pdf", b"%PDF-1.4 demo".to_vec())
    }

    #[tokio::test]
    async fn seed_data_loads() {
        let list = store()
            .list_invoices(&ListInvoicesParams::default())
            .await
            .unwrap();
        assert_eq!(list.total, 3);
        assert_eq!(list.invoices[0].id, 3);
        assert_eq!(
            list.invoices[2].supplier_name(),
            Some("AB Svenska Bostäder")
        );
    }

    #[tokio::test]
    async fn status_filter_and_paging() {
        let store = store();
        let extracted = store
            .list_invoices(&ListInvoicesParams {
                status: Some(InvoiceStatus::Extracted),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(extracted.total, 2);

        let page = store
            .list_invoices(&ListInvoicesParams {
                skip: Some(1),
                limit: Some(1),
                status: None,
            })
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.invoices.len(), 1);
        assert_eq!(page.invoices[0].id, 2);
    }

    #[tokio::test]
    async fn upload_assigns_next_id_and_extracts() {
        let store = store();
        let invoice = store.upload(pdf("../faktura.PDF")).await.unwrap();
        assert_eq!(invoice.id, 4);
        assert_eq!(invoice.status, InvoiceStatus::Extracted);
        assert_eq!(invoice.original_filename, ".._faktura.PDF");
        assert_eq!(invoice.file_type.as_deref(), Some("pdf"));
        assert!(invoice.raw_ai_data.as_ref().unwrap().lines[0].has_suggestions());
    }

    #[tokio::test]
    async fn upload_rejects_unsupported_type() {
        let err = store()
            .upload(UploadFile::new("a.txt", "text/plain", b"hej".to_vec()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn approve_only_from_extracted() {
        let store = store();
        let request = ApprovalRequest {
            validated_data: ExtractedInvoice::default(),
        };

        let approved = store.approve_invoice(1, &request).await.unwrap();
        assert_eq!(approved.status, InvoiceStatus::Approved);
        assert!(approved.approved_at.is_some());

        let err = store.approve_invoice(1, &request).await.unwrap_err();
        assert_eq!(err.status(), Some(409));

        let err = store.approve_invoice(99, &request).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_reports_missing_invoice() {
        let store = store();
        store.delete_invoice(2).await.unwrap();
        assert!(store.get_invoice(2).await.unwrap_err().is_not_found());
        assert!(store.delete_invoice(2).await.unwrap_err().is_not_found());
    }
}
