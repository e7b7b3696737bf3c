use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::any::Any;
use thiserror::Error;
use vostra_core::ApiError;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("session store failure: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("metrics encoding failed: {0}")]
    Metrics(#[from] prometheus::Error),
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub message: String,
}

/// HTTP status a page should use when it shows this API error.
pub fn api_error_status(err: &ApiError) -> StatusCode {
    match err {
        ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
        ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
        ApiError::Server { status, .. } if *status < 500 => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        ApiError::Server { .. } => StatusCode::BAD_GATEWAY,
        ApiError::Transport { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for FrontendError {
    fn into_response(self) -> Response {
        match self {
            FrontendError::Api(err) if err.is_not_found() => (
                StatusCode::NOT_FOUND,
                NotFoundTemplate {
                    message: err.message().to_string(),
                },
            )
                .into_response(),
            FrontendError::Api(err) => (
                api_error_status(&err),
                ErrorTemplate {
                    title: "Något gick fel".to_string(),
                    message: err.message().to_string(),
                },
            )
                .into_response(),
            other => {
                tracing::error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorTemplate {
                        title: "Något gick fel".to_string(),
                        message: "Ett oväntat fel inträffade. Försök igen.".to_string(),
                    },
                )
                    .into_response()
            }
        }
    }
}

/// Last-resort page for a handler that panicked.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Handler panicked");

    let page = ErrorTemplate {
        title: "Något gick fel".to_string(),
        message: "Ett oväntat fel inträffade. Ladda om sidan eller gå tillbaka till startsidan."
            .to_string(),
    };
    let body = page
        .render()
        .unwrap_or_else(|_| "Något gick fel. Ladda om sidan.".to_string());
    (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
}
