//! Per-invoice review controller guarding the approval round-trip.
//!
//! A session is stored between requests, so an approval is split into
//! [`ReviewSession::begin_approval`] and [`ReviewSession::complete_approval`]
//! with the network call in between. The generation counter lets a response
//! that arrives after a reload be recognised and dropped.

use serde::{Deserialize, Serialize};

use super::state::ReviewState;
use crate::api::ApprovalRequest;
use crate::error::ApiError;
use crate::models::{Invoice, InvoiceStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSession {
    invoice: Invoice,
    state: ReviewState,
    generation: u64,
    in_flight: Option<u64>,
}

/// Issued by [`ReviewSession::begin_approval`]; redeemed exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalTicket {
    pub generation: u64,
    pub request: ApprovalRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApprovalOutcome {
    /// The backend accepted the approval and the session now reflects it.
    Applied(Box<Invoice>),
    Failed(ApiError),
    /// The session was reloaded after the ticket was issued.
    Discarded,
}

impl ReviewSession {
    pub fn new(invoice: Invoice) -> Self {
        let state = ReviewState::from_invoice(&invoice);
        Self {
            invoice,
            state,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    pub fn invoice_id(&self) -> i64 {
        self.invoice.id
    }

    pub fn status(&self) -> InvoiceStatus {
        self.invoice.status
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ReviewState {
        &mut self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_approval_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Replaces the working copy with fresh backend data. Local edits are
    /// dropped and any outstanding ticket becomes stale.
    pub fn reload(&mut self, invoice: Invoice) {
        self.state = ReviewState::from_invoice(&invoice);
        self.invoice = invoice;
        self.generation += 1;
        self.in_flight = None;
    }

    /// Returns `None` while an earlier approval has not completed.
    pub fn begin_approval(&mut self) -> Option<ApprovalTicket> {
        if self.in_flight.is_some() {
            tracing::debug!(
                invoice_id = self.invoice.id,
                generation = self.generation,
                "Approval already in flight"
            );
            return None;
        }
        self.in_flight = Some(self.generation);
        Some(ApprovalTicket {
            generation: self.generation,
            request: self.state.build_approval_payload(),
        })
    }

    pub fn complete_approval(
        &mut self,
        ticket: ApprovalTicket,
        result: Result<Invoice, ApiError>,
    ) -> ApprovalOutcome {
        if ticket.generation != self.generation || self.in_flight != Some(ticket.generation) {
            tracing::info!(
                invoice_id = self.invoice.id,
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                "Discarding stale approval response"
            );
            return ApprovalOutcome::Discarded;
        }

        self.in_flight = None;
        match result {
            Ok(invoice) => {
                self.reload(invoice.clone());
                ApprovalOutcome::Applied(Box::new(invoice))
            }
            Err(err) => ApprovalOutcome::Failed(err),
        }
    }
}
