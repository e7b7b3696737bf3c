pub mod invoice;
pub mod line_item;
pub mod timestamp;

pub use invoice::{Buyer, ExtractedInvoice, Invoice, InvoiceList, InvoiceStatus, Supplier};
pub use line_item::{AiSuggestion, ConfidenceTier, Explainability, LineItem, Uncertainty};
