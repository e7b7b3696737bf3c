//! Invoice review page and its line and approval actions.
//!
//! Line actions mutate the review session stored in the user's session and
//! redirect back to the detail page. Nothing is sent to the backend until
//! the invoice is approved.

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use validator::Validate;
use vostra_core::models::Invoice;
use vostra_core::{ApprovalOutcome, ReviewError, ReviewSession, ReviewState};

use crate::error::{api_error_status, FrontendError, NotFoundTemplate};
use crate::models::{Flash, InvoiceDetailView};
use crate::session::{load_review, persist, refresh, save_review, set_flash, take_flash};
use crate::AppState;

#[derive(Template)]
#[template(path = "invoice.html")]
pub struct InvoiceTemplate {
    pub invoice: Option<InvoiceDetailView>,
    pub flash: Option<Flash>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AccountForm {
    #[validate(length(min = 1, max = 20, message = "Ange ett kontonummer."))]
    pub account: String,
}

fn detail_url(id: i64) -> String {
    format!("/demo/invoice/{id}")
}

fn line_url(id: i64, line_number: u32) -> String {
    format!("/demo/invoice/{id}#line-{line_number}")
}

/// Keeps local edits while the backend record is unchanged; otherwise the
/// working copy is rebuilt from the fresh record.
fn open_review(existing: Option<ReviewSession>, invoice: Invoice) -> ReviewSession {
    match existing {
        Some(review)
            if review.status() == invoice.status
                && review.invoice().updated_at == invoice.updated_at =>
        {
            review
        }
        Some(mut review) => {
            tracing::info!(
                invoice_id = invoice.id,
                status = %invoice.status,
                "Backend record changed, reloading review"
            );
            review.reload(invoice);
            review
        }
        None => ReviewSession::new(invoice),
    }
}

pub async fn invoice_detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, FrontendError> {
    let flash = take_flash(&session).await?;

    let invoice = match state.invoices.get_invoice(id).await {
        Ok(invoice) => invoice,
        Err(err) if err.is_not_found() => {
            return Ok((
                api_error_status(&err),
                NotFoundTemplate {
                    message: err.message().to_string(),
                },
            )
                .into_response())
        }
        Err(err) => {
            let page = InvoiceTemplate {
                invoice: None,
                flash,
                error: Some(err.message().to_string()),
            };
            return Ok((api_error_status(&err), page).into_response());
        }
    };

    let review = open_review(load_review(&session, id).await?, invoice);
    save_review(&session, &review).await?;

    Ok(InvoiceTemplate {
        invoice: Some(InvoiceDetailView::from(&review)),
        flash,
        error: None,
    }
    .into_response())
}

/// Applies `action` to the stored working copy. A missing session sends
/// the user to the detail page, which opens one.
async fn with_review<T>(
    session: &Session,
    id: i64,
    line_number: u32,
    action: impl FnOnce(&mut ReviewState) -> Result<T, ReviewError>,
) -> Result<Redirect, FrontendError> {
    let Some(mut review) = load_review(session, id).await? else {
        return Ok(Redirect::to(&detail_url(id)));
    };

    if let Err(err) = action(review.state_mut()) {
        tracing::debug!(invoice_id = id, line_number, error = %err, "Review action rejected");
        set_flash(session, Flash::error(err.to_string())).await?;
    }
    save_review(session, &review).await?;
    Ok(Redirect::to(&line_url(id, line_number)))
}

pub async fn select_account(
    session: Session,
    Path((id, line_number)): Path<(i64, u32)>,
    Form(form): Form<AccountForm>,
) -> Result<Redirect, FrontendError> {
    if let Err(errors) = form.validate() {
        tracing::debug!(invoice_id = id, line_number, %errors, "Invalid account form");
        set_flash(&session, Flash::error("Ange ett giltigt kontonummer.")).await?;
        return Ok(Redirect::to(&line_url(id, line_number)));
    }
    with_review(&session, id, line_number, |state| {
        state.select_suggestion(line_number, form.account)
    })
    .await
}

pub async fn approve_line(
    session: Session,
    Path((id, line_number)): Path<(i64, u32)>,
) -> Result<Redirect, FrontendError> {
    with_review(&session, id, line_number, |state| {
        state.approve_line(line_number)
    })
    .await
}

pub async fn toggle_explanation(
    session: Session,
    Path((id, line_number)): Path<(i64, u32)>,
) -> Result<Redirect, FrontendError> {
    with_review(&session, id, line_number, |state| {
        state.toggle_explanation(line_number)
    })
    .await
}

/// Submits the approval. The in-flight marker is written to the session
/// store before the backend call so a repeated submit is a no-op, and the
/// stored record is read back afterwards so a review reloaded meanwhile
/// discards the late response.
pub async fn approve_invoice(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Redirect, FrontendError> {
    let Some(mut review) = load_review(&session, id).await? else {
        return Ok(Redirect::to(&detail_url(id)));
    };

    let Some(ticket) = review.begin_approval() else {
        set_flash(&session, Flash::error("Godkännandet pågår redan.")).await?;
        return Ok(Redirect::to(&detail_url(id)));
    };
    save_review(&session, &review).await?;
    persist(&session).await?;

    let result = state.invoices.approve_invoice(id, &ticket.request).await;

    refresh(&session).await?;
    let Some(mut review) = load_review(&session, id).await? else {
        tracing::info!(invoice_id = id, "Review closed before approval completed");
        return Ok(Redirect::to(&detail_url(id)));
    };

    match review.complete_approval(ticket, result) {
        ApprovalOutcome::Applied(_) => {
            set_flash(&session, Flash::success("Fakturan är godkänd.")).await?;
        }
        ApprovalOutcome::Failed(err) => {
            set_flash(&session, Flash::error(err.message())).await?;
        }
        ApprovalOutcome::Discarded => {
            tracing::info!(invoice_id = id, "Approval response arrived for a reloaded review");
        }
    }
    save_review(&session, &review).await?;

    Ok(Redirect::to(&detail_url(id)))
}
