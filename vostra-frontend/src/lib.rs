pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod session;
pub mod startup;

use std::sync::Arc;
use vostra_core::InvoiceApi;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub invoices: Arc<dyn InvoiceApi>,
    pub max_upload_bytes: usize,
    pub demo_mode: bool,
}

impl AppState {
    pub fn new(invoices: Arc<dyn InvoiceApi>, max_upload_bytes: usize, demo_mode: bool) -> Self {
        Self {
            invoices,
            max_upload_bytes,
            demo_mode,
        }
    }
}
