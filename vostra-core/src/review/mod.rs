pub mod session;
pub mod state;

pub use session::{ApprovalOutcome, ApprovalTicket, ReviewSession};
pub use state::{ReviewProgress, ReviewState};
