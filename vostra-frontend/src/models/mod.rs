pub mod flash;
pub mod format;
pub mod view;

pub use flash::{Flash, FlashKind};
pub use view::{InvoiceDetailView, InvoiceRow, LineView, SuggestionView};
