//! Typed access to the values this app keeps in the user's session.

use tower_sessions::Session;
use vostra_core::ReviewSession;

use crate::error::FrontendError;
use crate::models::Flash;

const FLASH_KEY: &str = "flash";

fn review_key(invoice_id: i64) -> String {
    format!("review:{invoice_id}")
}

pub async fn load_review(
    session: &Session,
    invoice_id: i64,
) -> Result<Option<ReviewSession>, FrontendError> {
    Ok(session.get(&review_key(invoice_id)).await?)
}

pub async fn save_review(session: &Session, review: &ReviewSession) -> Result<(), FrontendError> {
    session.insert(&review_key(review.invoice_id()), review).await?;
    Ok(())
}

/// Writes this request's session record to the store immediately, so
/// concurrent requests from the same browser observe it.
pub async fn persist(session: &Session) -> Result<(), FrontendError> {
    session.save().await?;
    Ok(())
}

/// Replaces this request's copy of the session with the stored record.
pub async fn refresh(session: &Session) -> Result<(), FrontendError> {
    session.load().await?;
    Ok(())
}

pub async fn forget_review(session: &Session, invoice_id: i64) -> Result<(), FrontendError> {
    session
        .remove::<ReviewSession>(&review_key(invoice_id))
        .await?;
    Ok(())
}

pub async fn set_flash(session: &Session, flash: Flash) -> Result<(), FrontendError> {
    session.insert(FLASH_KEY, flash).await?;
    Ok(())
}

pub async fn take_flash(session: &Session) -> Result<Option<Flash>, FrontendError> {
    Ok(session.remove(FLASH_KEY).await?)
}
