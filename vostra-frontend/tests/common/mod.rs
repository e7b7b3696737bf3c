#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use vostra_core::api::{ApprovalRequest, ListInvoicesParams, UploadFile};
use vostra_core::upload::DEFAULT_MAX_UPLOAD_BYTES;
use vostra_core::{ApiError, InvoiceApi};
use vostra_frontend::services::{DemoInvoiceStore, InvoiceClient};
use vostra_frontend::startup::build_router;
use vostra_frontend::AppState;

/// A stand-in for the invoice backend speaking the real HTTP contract,
/// with its data held in a [`DemoInvoiceStore`].
pub struct FakeBackend {
    pub address: String,
    pub store: Arc<DemoInvoiceStore>,
}

impl FakeBackend {
    pub async fn spawn(store: DemoInvoiceStore) -> Self {
        let store = Arc::new(store);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let port = listener.local_addr().unwrap().port();
        let app = backend_router(store.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            address: format!("http://127.0.0.1:{}", port),
            store,
        }
    }

    pub fn client(&self) -> InvoiceClient {
        InvoiceClient::with_client(reqwest::Client::new(), &self.address)
    }
}

struct BackendError(ApiError);

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self
            .0
            .status()
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::BAD_REQUEST);
        (status, Json(serde_json::json!({ "detail": self.0.message() }))).into_response()
    }
}

impl From<ApiError> for BackendError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

type Store = State<Arc<DemoInvoiceStore>>;

fn backend_router(store: Arc<DemoInvoiceStore>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/invoices", get(list))
        .route("/api/invoices/upload", post(upload))
        .route("/api/invoices/:id", get(fetch).delete(remove))
        .route("/api/invoices/:id/approve", post(approve))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
        .with_state(store)
}

async fn health(State(store): Store) -> Result<impl IntoResponse, BackendError> {
    Ok(Json(store.health_check().await?))
}

async fn list(
    State(store): Store,
    Query(params): Query<ListInvoicesParams>,
) -> Result<impl IntoResponse, BackendError> {
    Ok(Json(store.list_invoices(&params).await?))
}

async fn upload(
    State(store): Store,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, BackendError> {
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await.unwrap().to_vec();
        let invoice = store
            .upload(UploadFile::new(file_name, content_type, data))
            .await?;
        return Ok((StatusCode::CREATED, Json(invoice)));
    }
    Err(ApiError::server(422, "field required").into())
}

async fn fetch(State(store): Store, Path(id): Path<i64>) -> Result<impl IntoResponse, BackendError> {
    Ok(Json(store.get_invoice(id).await?))
}

async fn approve(
    State(store): Store,
    Path(id): Path<i64>,
    Json(request): Json<ApprovalRequest>,
) -> Result<impl IntoResponse, BackendError> {
    Ok(Json(store.approve_invoice(id, &request).await?))
}

async fn remove(State(store): Store, Path(id): Path<i64>) -> Result<impl IntoResponse, BackendError> {
    store.delete_invoice(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The web front-end wired to an arbitrary invoice API.
pub fn frontend(invoices: Arc<dyn InvoiceApi>) -> Router {
    build_router(AppState::new(invoices, DEFAULT_MAX_UPLOAD_BYTES, true))
}

pub fn seeded_store() -> DemoInvoiceStore {
    DemoInvoiceStore::seeded(DEFAULT_MAX_UPLOAD_BYTES).expect("Failed to load demo invoices")
}

pub const BOUNDARY: &str = "vostra-test-boundary";

/// A `multipart/form-data` upload request for `/demo/upload`.
pub fn upload_request(file_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/demo/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
