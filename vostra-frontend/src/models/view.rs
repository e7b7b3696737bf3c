//! Template-ready projections of invoices and review sessions. All display
//! strings are computed here so templates only print fields.

use vostra_core::models::{AiSuggestion, Invoice, LineItem};
use vostra_core::ReviewSession;

use super::format;

#[derive(Debug, Clone)]
pub struct InvoiceRow {
    pub id: i64,
    pub file_name: String,
    pub supplier: String,
    pub invoice_number: String,
    pub total: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub created_at: String,
}

impl From<&Invoice> for InvoiceRow {
    fn from(invoice: &Invoice) -> Self {
        let data = invoice.extraction();
        Self {
            id: invoice.id,
            file_name: invoice.original_filename.clone(),
            supplier: invoice.supplier_name().unwrap_or("–").to_string(),
            invoice_number: data
                .and_then(|d| d.invoice_number.clone())
                .unwrap_or_else(|| "–".to_string()),
            total: invoice
                .total()
                .map(|total| format::money(total, invoice.currency()))
                .unwrap_or_else(|| "–".to_string()),
            status: invoice.status.as_str(),
            status_label: invoice.status.label(),
            created_at: format::timestamp(invoice.created_at),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SuggestionView {
    pub account_number: String,
    pub account_name: String,
    pub percent: u8,
    pub tier: &'static str,
    pub explanation: String,
    pub selected: bool,
    pub has_xai: bool,
    pub matched_words: String,
    pub similar_history: u32,
    pub uncertainty: &'static str,
    pub basis: String,
}

impl SuggestionView {
    fn new(suggestion: &AiSuggestion, effective_account: Option<&str>) -> Self {
        let xai = suggestion.xai.as_ref();
        Self {
            account_number: suggestion.account_number.clone(),
            account_name: suggestion.account_name.clone(),
            percent: suggestion.percent(),
            tier: suggestion.tier().as_str(),
            explanation: suggestion.explanation.clone(),
            selected: effective_account == Some(suggestion.account_number.as_str()),
            has_xai: xai.is_some(),
            matched_words: xai.map(|x| x.matched_words.join(", ")).unwrap_or_default(),
            similar_history: xai.map(|x| x.similar_history).unwrap_or_default(),
            uncertainty: xai.map(|x| x.uncertainty.label()).unwrap_or_default(),
            basis: xai.map(|x| x.basis.clone()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineView {
    pub line_number: u32,
    pub description: String,
    pub detail: String,
    pub amount: String,
    pub vat: String,
    /// Empty when the line has neither a choice nor suggestions.
    pub account: String,
    /// Account typed by the reviewer that matches no suggestion.
    pub custom_account: bool,
    pub approved: bool,
    pub expanded: bool,
    pub suggestions: Vec<SuggestionView>,
}

impl LineView {
    fn new(line: &LineItem, currency: &str, expanded: bool) -> Self {
        let effective = line.effective_account();
        let mut detail = Vec::new();
        if let Some(period) = &line.period {
            detail.push(period.clone());
        }
        if let (Some(quantity), Some(unit_price)) = (line.quantity, line.unit_price) {
            let unit = line.unit.as_deref().unwrap_or("st");
            detail.push(format!(
                "{} {} à {}",
                quantity.normalize(),
                unit,
                format::money(unit_price, currency)
            ));
        }

        Self {
            line_number: line.line_number,
            description: line.description.clone(),
            detail: detail.join(" · "),
            amount: format::money(line.amount, currency),
            vat: format!(
                "{} ({})",
                format::money(line.vat_amount, currency),
                format::percent(line.vat_rate)
            ),
            account: effective.unwrap_or_default().to_string(),
            custom_account: effective.is_some() && line.selected_suggestion().is_none(),
            approved: line.approved,
            expanded,
            suggestions: line
                .ai_suggestions
                .iter()
                .map(|s| SuggestionView::new(s, effective))
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InvoiceDetailView {
    pub id: i64,
    pub file_name: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub error_message: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub due_date: String,
    pub supplier: String,
    pub supplier_org_number: String,
    pub buyer: String,
    pub ocr_number: String,
    pub payment_method: String,
    pub subtotal: String,
    pub vat_amount: String,
    pub total: String,
    pub approved_lines: usize,
    pub total_lines: usize,
    pub all_lines_approved: bool,
    /// Line edits are hidden once the invoice is approved or failed.
    pub editable: bool,
    pub can_approve: bool,
    pub approval_in_flight: bool,
    pub lines: Vec<LineView>,
}

impl From<&ReviewSession> for InvoiceDetailView {
    fn from(session: &ReviewSession) -> Self {
        let invoice = session.invoice();
        let state = session.state();
        let data = state.document();
        let currency = invoice.currency();
        let money = |value: Option<rust_decimal::Decimal>| {
            value
                .map(|v| format::money(v, currency))
                .unwrap_or_else(|| "–".to_string())
        };
        let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "–".to_string());
        let progress = state.progress();

        Self {
            id: invoice.id,
            file_name: invoice.original_filename.clone(),
            status: invoice.status.as_str(),
            status_label: invoice.status.label(),
            error_message: invoice.error_message.clone().unwrap_or_default(),
            invoice_number: text(&data.invoice_number),
            invoice_date: text(&data.invoice_date),
            due_date: text(&data.due_date),
            supplier: data
                .supplier
                .as_ref()
                .map(|s| s.name.clone())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "–".to_string()),
            supplier_org_number: data
                .supplier
                .as_ref()
                .map(|s| s.org_number.clone())
                .unwrap_or_default(),
            buyer: data
                .buyer
                .as_ref()
                .map(|b| b.name.clone())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "–".to_string()),
            ocr_number: text(&data.ocr_number),
            payment_method: text(&data.payment_method),
            subtotal: money(data.subtotal),
            vat_amount: money(data.vat_amount),
            total: money(data.total),
            approved_lines: progress.approved,
            total_lines: progress.total,
            all_lines_approved: state.is_fully_approved(),
            editable: !invoice.status.is_terminal(),
            can_approve: invoice.status.is_approvable() && !session.is_approval_in_flight(),
            approval_in_flight: session.is_approval_in_flight(),
            lines: state
                .lines()
                .iter()
                .map(|line| LineView::new(line, currency, state.is_expanded(line.line_number)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vostra_core::models::InvoiceStatus;

    fn session() -> ReviewSession {
        let invoice: Invoice = serde_json::from_value(json!({
            "id": 1,
            "status": "extracted",
            "original_filename": "faktura.pdf",
            "raw_ai_data": {
                "invoice_number": "21196546317",
                "supplier": {"name": "AB Svenska Bostäder", "org_number": "556043-6429", "address": "Box 95"},
                "total": 33813,
                "lines": [{
                    "line_number": 1,
                    "description": "Hyra lokal",
                    "period": "2025-07-01 – 2025-09-30",
                    "amount": 22257,
                    "ai_suggestions": [
                        {"account_number": "5010", "account_name": "Lokalhyra", "confidence": 0.92,
                         "xai": {"matched_words": ["hyra", "lokal"], "similar_history": 43, "uncertainty": "låg", "basis": "radtext"}},
                        {"account_number": "5000", "account_name": "Lokalkostnader", "confidence": 0.78}
                    ]
                }]
            }
        }))
        .unwrap();
        ReviewSession::new(invoice)
    }

    #[test]
    fn detail_view_marks_default_suggestion() {
        let view = InvoiceDetailView::from(&session());
        assert_eq!(view.total, "33 813,00 SEK");
        assert_eq!(view.supplier, "AB Svenska Bostäder");
        assert!(view.can_approve);

        let line = &view.lines[0];
        assert_eq!(line.account, "5010");
        assert!(!line.custom_account);
        assert!(line.suggestions[0].selected);
        assert_eq!(line.suggestions[0].tier, "high");
        assert_eq!(line.suggestions[0].matched_words, "hyra, lokal");
        assert_eq!(line.suggestions[1].tier, "medium");
        assert!(!line.suggestions[1].has_xai);
    }

    #[test]
    fn custom_account_is_flagged() {
        let mut session = session();
        session.state_mut().select_suggestion(1, "5090").unwrap();
        let view = InvoiceDetailView::from(&session);
        assert_eq!(view.lines[0].account, "5090");
        assert!(view.lines[0].custom_account);
        assert!(view.lines[0].suggestions.iter().all(|s| !s.selected));
    }

    #[test]
    fn in_flight_approval_disables_button() {
        let mut session = session();
        session.begin_approval().unwrap();
        let view = InvoiceDetailView::from(&session);
        assert!(!view.can_approve);
        assert!(view.approval_in_flight);
    }

    #[test]
    fn approved_invoice_is_read_only() {
        let mut session = session();
        session.state_mut().approve_line(1).unwrap();
        let view = InvoiceDetailView::from(&session);
        assert!(view.all_lines_approved);
        assert!(view.editable);

        let mut approved = session.invoice().clone();
        approved.status = InvoiceStatus::Approved;
        session.reload(approved);
        let view = InvoiceDetailView::from(&session);
        assert!(!view.editable);
        assert!(!view.can_approve);
    }
}
