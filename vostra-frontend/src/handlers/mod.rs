pub mod app;
pub mod invoices;
pub mod metrics;
pub mod review;
pub mod upload;
