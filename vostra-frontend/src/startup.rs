use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use vostra_core::observability::{extract_request_id, extract_traceparent};

use crate::error::panic_response;
use crate::handlers::{
    app::{health_check, index},
    invoices::{delete_invoice, list_invoices_page},
    metrics::metrics,
    review::{approve_invoice, approve_line, invoice_detail, select_account, toggle_explanation},
    upload::{upload_handler, upload_page},
};
use crate::middleware::{metrics_middleware, request_id_middleware};
use crate::AppState;

/// Multipart framing on top of the file itself.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false) // Set to true in production with HTTPS
        .with_expiry(Expiry::OnInactivity(Duration::hours(24)));

    let body_limit = state.max_upload_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/demo/invoices", get(list_invoices_page))
        .route(
            "/demo/upload",
            get(upload_page)
                .post(upload_handler)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/demo/invoice/:id", get(invoice_detail))
        .route("/demo/invoice/:id/approve", post(approve_invoice))
        .route("/demo/invoice/:id/delete", post(delete_invoice))
        .route("/demo/invoice/:id/lines/:line/account", post(select_account))
        .route("/demo/invoice/:id/lines/:line/approve", post(approve_line))
        .route(
            "/demo/invoice/:id/lines/:line/explanation",
            post(toggle_explanation),
        )
        .route_layer(from_fn(metrics_middleware))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let headers = request.headers();
                let request_id = extract_request_id(headers).unwrap_or_else(|| "-".to_string());
                let traceparent = extract_traceparent(headers).unwrap_or_default();

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    traceparent = %traceparent,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
