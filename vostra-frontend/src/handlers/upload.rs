use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use vostra_core::api::UploadFile;
use vostra_core::upload::{file_too_large, sanitize_file_name, validate_upload};

use crate::error::api_error_status;
use crate::AppState;

#[derive(Template)]
#[template(path = "upload.html")]
pub struct UploadTemplate {
    pub max_size_mb: usize,
    pub error: Option<String>,
}

impl UploadTemplate {
    fn new(state: &AppState, error: Option<String>) -> Self {
        Self {
            max_size_mb: state.max_upload_bytes / (1024 * 1024),
            error,
        }
    }
}

pub async fn upload_page(State(state): State<AppState>) -> impl IntoResponse {
    UploadTemplate::new(&state, None)
}

/// Failed form reads are answered with the upload page. Reads cut off by
/// the body limit get the size message and 413.
fn form_error(state: &AppState, err: MultipartError, message: &str) -> Response {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!(error = %err, "Upload exceeded the body limit");
        let err = file_too_large(state.max_upload_bytes);
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            UploadTemplate::new(state, Some(err.message().to_string())),
        )
            .into_response();
    }

    tracing::warn!(error = %err, "Malformed upload form");
    (
        StatusCode::BAD_REQUEST,
        UploadTemplate::new(state, Some(message.to_string())),
    )
        .into_response()
}

/// Reads the `file` field of the form. Other fields are ignored.
async fn read_file_field(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<Option<UploadFile>, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => return Err(form_error(state, e, "Uppladdningen kunde inte läsas.")),
        };
        if field.name() != Some("file") {
            continue;
        }

        let file_name = sanitize_file_name(field.file_name().unwrap_or("faktura"));
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| form_error(state, e, "Filen kunde inte läsas."))?;

        return Ok(Some(UploadFile::new(file_name, content_type, data.to_vec())));
    }
}

pub async fn upload_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let file = match read_file_field(&state, &mut multipart).await {
        Ok(Some(file)) => file,
        Ok(None) => {
            let page = UploadTemplate::new(&state, Some("Välj en fil att ladda upp.".to_string()));
            return (StatusCode::BAD_REQUEST, page).into_response();
        }
        Err(response) => return response,
    };

    let result = match validate_upload(&file, state.max_upload_bytes) {
        Ok(()) => state.invoices.upload(file).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(invoice) => Redirect::to(&format!("/demo/invoice/{}", invoice.id)).into_response(),
        Err(err) => (
            api_error_status(&err),
            UploadTemplate::new(&state, Some(err.message().to_string())),
        )
            .into_response(),
    }
}
