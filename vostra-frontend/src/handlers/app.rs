use askama::Template;
use axum::{extract::State, response::IntoResponse};

use crate::AppState;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub demo_mode: bool,
}

pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    IndexTemplate {
        demo_mode: state.demo_mode,
    }
}

/// Liveness of this process only; the backend is not contacted.
pub async fn health_check() -> &'static str {
    "OK"
}
