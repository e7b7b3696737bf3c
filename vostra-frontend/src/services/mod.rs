pub mod demo_store;
pub mod invoice_client;
pub mod metrics;

pub use demo_store::DemoInvoiceStore;
pub use invoice_client::InvoiceClient;
