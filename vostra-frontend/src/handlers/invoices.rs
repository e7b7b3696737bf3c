use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use validator::Validate;
use vostra_core::api::ListInvoicesParams;
use vostra_core::models::InvoiceStatus;

use crate::error::{api_error_status, FrontendError};
use crate::models::{Flash, InvoiceRow};
use crate::session::{forget_review, set_flash, take_flash};
use crate::AppState;

pub const DEFAULT_LIMIT: u32 = 20;

#[derive(Template)]
#[template(path = "invoices.html")]
pub struct InvoicesTemplate {
    pub rows: Vec<InvoiceRow>,
    pub total: u64,
    pub flash: Option<Flash>,
    pub error: Option<String>,
    pub status_filter: String,
    pub statuses: Vec<StatusOption>,
    pub limit: u32,
    pub prev_skip: Option<u32>,
    pub next_skip: Option<u32>,
}

pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListQuery {
    pub skip: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "Antal per sida måste vara mellan 1 och 100."))]
    pub limit: Option<u32>,
    pub status: Option<String>,
}

impl ListQuery {
    /// Checks the query and converts it for the API. An empty status means
    /// no filter.
    fn to_params(&self) -> Result<ListInvoicesParams, String> {
        if let Err(errors) = self.validate() {
            let message = errors
                .field_errors()
                .values()
                .flat_map(|errs| errs.iter())
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .next()
                .unwrap_or_else(|| "Ogiltiga sökparametrar.".to_string());
            return Err(message);
        }

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(
                InvoiceStatus::parse(value).ok_or_else(|| format!("Okänd status: {value}"))?,
            ),
        };

        Ok(ListInvoicesParams {
            skip: Some(self.skip.unwrap_or(0)),
            limit: Some(self.limit.unwrap_or(DEFAULT_LIMIT)),
            status,
        })
    }
}

pub async fn list_invoices_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Response, FrontendError> {
    let flash = take_flash(&session).await?;
    let status_filter = query.status.clone().unwrap_or_default();
    let mut page = InvoicesTemplate {
        rows: Vec::new(),
        total: 0,
        flash,
        error: None,
        statuses: InvoiceStatus::ALL
            .iter()
            .map(|s| StatusOption {
                value: s.as_str(),
                label: s.label(),
                selected: s.as_str() == status_filter,
            })
            .collect(),
        status_filter,
        limit: query.limit.unwrap_or(DEFAULT_LIMIT),
        prev_skip: None,
        next_skip: None,
    };

    let params = match query.to_params() {
        Ok(params) => params,
        Err(message) => {
            page.error = Some(message);
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        }
    };

    match state.invoices.list_invoices(&params).await {
        Ok(list) => {
            let skip = params.skip.unwrap_or(0);
            let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
            page.total = list.total;
            page.rows = list.invoices.iter().map(InvoiceRow::from).collect();
            page.prev_skip = (skip > 0).then(|| skip.saturating_sub(limit));
            page.next_skip = (u64::from(skip) + u64::from(limit) < list.total)
                .then(|| skip + limit);
            Ok(page.into_response())
        }
        Err(err) => {
            let status = api_error_status(&err);
            page.error = Some(err.message().to_string());
            Ok((status, page).into_response())
        }
    }
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Redirect, FrontendError> {
    match state.invoices.delete_invoice(id).await {
        Ok(()) => {
            forget_review(&session, id).await?;
            set_flash(&session, Flash::success("Fakturan har tagits bort.")).await?;
        }
        Err(err) => {
            tracing::warn!(invoice_id = id, error = %err, "Delete failed");
            set_flash(&session, Flash::error(err.message())).await?;
        }
    }
    Ok(Redirect::to("/demo/invoices"))
}
