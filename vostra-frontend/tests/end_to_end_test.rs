mod common;

use common::FakeBackend;
use vostra_core::api::{ListInvoicesParams, UploadFile};
use vostra_core::models::InvoiceStatus;
use vostra_core::upload::{validate_upload, DEFAULT_MAX_UPLOAD_BYTES};
use vostra_core::{ApprovalOutcome, InvoiceApi, ReviewSession};
use vostra_frontend::services::DemoInvoiceStore;

fn pdf(name: &str, size: usize) -> UploadFile {
    let mut data = b"%PDF-1.4\n".to_vec();
    data.resize(size, b'0');
    UploadFile::new(name, "application/pdf", data)
}

#[tokio::test]
async fn upload_review_and_approve() {
    let backend = FakeBackend::spawn(DemoInvoiceStore::new(DEFAULT_MAX_UPLOAD_BYTES)).await;
    let client = backend.client();

    let file = pdf("faktura.pdf", 5 * 1024 * 1024);
    validate_upload(&file, DEFAULT_MAX_UPLOAD_BYTES).unwrap();
    let uploaded = client.upload(file).await.unwrap();
    assert!(matches!(
        uploaded.status,
        InvoiceStatus::Extracting | InvoiceStatus::Extracted
    ));
    assert_eq!(uploaded.file_size, Some(5 * 1024 * 1024));

    let fetched = client.get_invoice(uploaded.id).await.unwrap();
    assert_eq!(fetched.id, uploaded.id);

    // No line is touched, so every account comes from the first suggestion.
    let mut review = ReviewSession::new(fetched);
    assert!(review.state().lines().iter().all(|l| l.user_account.is_none()));
    let ticket = review.begin_approval().unwrap();
    assert!(ticket
        .request
        .validated_data
        .lines
        .iter()
        .all(|l| l.user_account.is_some()));

    let result = client.approve_invoice(uploaded.id, &ticket.request).await;
    let outcome = review.complete_approval(ticket, result);
    assert!(matches!(outcome, ApprovalOutcome::Applied(_)));
    assert_eq!(review.status(), InvoiceStatus::Approved);

    let stored = backend.store.get_invoice(uploaded.id).await.unwrap();
    assert_eq!(stored.status, InvoiceStatus::Approved);
    let validated = stored.user_validated_data.unwrap();
    assert_eq!(validated.lines[0].user_account.as_deref(), Some("6550"));
}

#[tokio::test]
async fn approving_twice_is_a_conflict() {
    let backend = FakeBackend::spawn(common::seeded_store()).await;
    let client = backend.client();

    let mut review = ReviewSession::new(client.get_invoice(3).await.unwrap());
    let ticket = review.begin_approval().unwrap();
    client.approve_invoice(3, &ticket.request).await.unwrap();

    let err = client.approve_invoice(3, &ticket.request).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert!(err.message().contains("Godkänd"));
}

#[tokio::test]
async fn list_pages_and_reports_total() {
    let backend = FakeBackend::spawn(DemoInvoiceStore::new(DEFAULT_MAX_UPLOAD_BYTES)).await;
    let client = backend.client();
    for i in 0..3 {
        client.upload(pdf(&format!("f{i}.pdf"), 1024)).await.unwrap();
    }

    let page = client
        .list_invoices(&ListInvoicesParams {
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.invoices.len(), 2);
    assert_eq!(page.total, 3);
}

#[tokio::test]
async fn deleted_invoice_is_not_found() {
    let backend = FakeBackend::spawn(common::seeded_store()).await;
    let client = backend.client();

    client.delete_invoice(1).await.unwrap();
    let err = client.get_invoice(1).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.message(), "Fakturan hittades inte.");
    assert!(client.delete_invoice(1).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn backend_rejection_of_upload_carries_status() {
    let backend = FakeBackend::spawn(common::seeded_store()).await;
    let err = backend
        .client()
        .upload(UploadFile::new("notes.txt", "text/plain", b"hej".to_vec()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(
        err.message(),
        "Ogiltig filtyp. Endast PDF, PNG och JPG tillåts."
    );
}

#[tokio::test]
async fn health_check_reports_status() {
    let backend = FakeBackend::spawn(common::seeded_store()).await;
    let health = backend.client().health_check().await.unwrap();
    assert_eq!(health["status"], "healthy");
}
