//! Working copy of one invoice's line items during review.
//!
//! All transitions are pure in-memory mutations. Nothing here performs I/O;
//! the approval payload is handed to an [`crate::InvoiceApi`] by the caller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::api::ApprovalRequest;
use crate::error::ReviewError;
use crate::models::{AiSuggestion, ExtractedInvoice, Invoice, LineItem};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    /// Extraction payload the lines came from, with `lines` emptied. Used as
    /// the base of the approval payload.
    document: ExtractedInvoice,
    lines: Vec<LineItem>,
    /// Line numbers whose suggestion explanations are shown.
    expanded: BTreeSet<u32>,
}

/// Approved lines out of all lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewProgress {
    pub approved: usize,
    pub total: usize,
}

impl ReviewState {
    pub fn new(lines: Vec<LineItem>) -> Self {
        Self {
            document: ExtractedInvoice::default(),
            lines,
            expanded: BTreeSet::new(),
        }
    }

    /// Builds the working copy from previously approved data when present,
    /// otherwise from the AI extraction.
    pub fn from_invoice(invoice: &Invoice) -> Self {
        let mut document = invoice.extraction().cloned().unwrap_or_default();
        let lines = std::mem::take(&mut document.lines);
        Self {
            document,
            lines,
            expanded: BTreeSet::new(),
        }
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn line(&self, line_number: u32) -> Option<&LineItem> {
        self.lines.iter().find(|l| l.line_number == line_number)
    }

    pub fn document(&self) -> &ExtractedInvoice {
        &self.document
    }

    fn line_mut(&mut self, line_number: u32) -> Result<&mut LineItem, ReviewError> {
        self.lines
            .iter_mut()
            .find(|l| l.line_number == line_number)
            .ok_or(ReviewError::UnknownLine(line_number))
    }

    /// Chooses an account for a line. Any prior approval of the line is
    /// revoked because the account changed.
    pub fn select_suggestion(
        &mut self,
        line_number: u32,
        account_number: impl Into<String>,
    ) -> Result<(), ReviewError> {
        let account_number = account_number.into().trim().to_string();
        if account_number.is_empty() {
            return Err(ReviewError::EmptyAccount(line_number));
        }
        let line = self.line_mut(line_number)?;
        line.user_account = Some(account_number);
        line.approved = false;
        Ok(())
    }

    /// Approves a line and returns the account it was approved with.
    ///
    /// Without an explicit choice the first suggestion's account is copied
    /// into `user_account`, so later changes to the suggestion list cannot
    /// alter what was approved.
    pub fn approve_line(&mut self, line_number: u32) -> Result<String, ReviewError> {
        let line = self.line_mut(line_number)?;
        let account = line
            .effective_account()
            .map(str::to_string)
            .ok_or(ReviewError::NothingToApprove(line_number))?;
        line.user_account = Some(account.clone());
        line.approved = true;
        Ok(account)
    }

    /// Swaps a line's suggestion list, e.g. after re-extraction. The line's
    /// `user_account` and approval are kept as they are.
    pub fn replace_suggestions(
        &mut self,
        line_number: u32,
        suggestions: Vec<AiSuggestion>,
    ) -> Result<(), ReviewError> {
        self.line_mut(line_number)?.ai_suggestions = suggestions;
        Ok(())
    }

    /// Shows or hides a line's explanations and returns the new visibility.
    pub fn toggle_explanation(&mut self, line_number: u32) -> Result<bool, ReviewError> {
        if self.line(line_number).is_none() {
            return Err(ReviewError::UnknownLine(line_number));
        }
        if self.expanded.remove(&line_number) {
            Ok(false)
        } else {
            self.expanded.insert(line_number);
            Ok(true)
        }
    }

    pub fn is_expanded(&self, line_number: u32) -> bool {
        self.expanded.contains(&line_number)
    }

    /// Snapshot of every line with `user_account` resolved to the effective
    /// account. Lines do not need to be individually approved; the backend
    /// decides whether a partially reviewed invoice is acceptable.
    pub fn build_approval_payload(&self) -> ApprovalRequest {
        let lines = self
            .lines
            .iter()
            .map(|line| {
                let mut line = line.clone();
                line.user_account = line.effective_account().map(str::to_string);
                line
            })
            .collect();

        ApprovalRequest {
            validated_data: ExtractedInvoice {
                lines,
                ..self.document.clone()
            },
        }
    }

    pub fn progress(&self) -> ReviewProgress {
        ReviewProgress {
            approved: self.lines.iter().filter(|l| l.approved).count(),
            total: self.lines.len(),
        }
    }

    pub fn is_fully_approved(&self) -> bool {
        !self.lines.is_empty() && self.lines.iter().all(|l| l.approved)
    }
}
