//! vostra-core: domain model, review workflow and API contract shared by the
//! VostraInvoice front-end.
pub mod api;
pub mod error;
pub mod models;
pub mod observability;
pub mod review;
pub mod upload;

pub use api::InvoiceApi;
pub use error::{ApiError, ReviewError};
pub use review::{ApprovalOutcome, ApprovalTicket, ReviewSession, ReviewState};

pub use async_trait;
pub use rust_decimal;
pub use serde_json;
pub use tracing;
