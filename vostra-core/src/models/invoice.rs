//! Invoice records as exchanged with the backend API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::line_item::LineItem;
use super::timestamp;

/// Invoice lifecycle as reported by the backend.
///
/// `uploaded → extracting → extracted → approved`, with `extraction_failed`
/// reachable from `uploaded` and `extracting`. The front-end only reads these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Uploaded,
    Extracting,
    Extracted,
    Approved,
    #[serde(alias = "failed")]
    ExtractionFailed,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 5] = [
        InvoiceStatus::Uploaded,
        InvoiceStatus::Extracting,
        InvoiceStatus::Extracted,
        InvoiceStatus::Approved,
        InvoiceStatus::ExtractionFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Uploaded => "uploaded",
            InvoiceStatus::Extracting => "extracting",
            InvoiceStatus::Extracted => "extracted",
            InvoiceStatus::Approved => "approved",
            InvoiceStatus::ExtractionFailed => "extraction_failed",
        }
    }

    /// Parses a wire value, including the legacy `failed`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "uploaded" => Some(InvoiceStatus::Uploaded),
            "extracting" => Some(InvoiceStatus::Extracting),
            "extracted" => Some(InvoiceStatus::Extracted),
            "approved" => Some(InvoiceStatus::Approved),
            "extraction_failed" | "failed" => Some(InvoiceStatus::ExtractionFailed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InvoiceStatus::Uploaded => "Uppladdad",
            InvoiceStatus::Extracting => "Tolkas",
            InvoiceStatus::Extracted => "Granskas",
            InvoiceStatus::Approved => "Godkänd",
            InvoiceStatus::ExtractionFailed => "Tolkning misslyckades",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InvoiceStatus::Approved | InvoiceStatus::ExtractionFailed
        )
    }

    pub fn is_approvable(&self) -> bool {
        matches!(self, InvoiceStatus::Extracted)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub org_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Buyer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

/// Extraction payload produced by the AI extractor, and the shape submitted
/// back on approval.
///
/// Every header field is optional because extraction can be partial. Fields
/// this type does not model are kept in `extra` and sent back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInvoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<Supplier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<Buyer>,
    #[serde(default)]
    pub lines: Vec<LineItem>,
    // Totals come from the backend and are never recomputed from lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Invoice record returned by every invoice endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub status: InvoiceStatus,
    pub original_filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub extracted_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_ai_data: Option<ExtractedInvoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_validated_data: Option<ExtractedInvoice>,
}

impl Invoice {
    /// Reviewer-approved data when present, otherwise the AI extraction.
    pub fn extraction(&self) -> Option<&ExtractedInvoice> {
        self.user_validated_data
            .as_ref()
            .or(self.raw_ai_data.as_ref())
    }

    pub fn supplier_name(&self) -> Option<&str> {
        self.extraction()
            .and_then(|data| data.supplier.as_ref())
            .map(|supplier| supplier.name.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn total(&self) -> Option<Decimal> {
        self.extraction().and_then(|data| data.total)
    }

    pub fn currency(&self) -> &str {
        self.extraction()
            .and_then(|data| data.currency.as_deref())
            .unwrap_or("SEK")
    }
}

/// One page of invoices plus the total count matching the filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceList {
    pub invoices: Vec<Invoice>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend_record() -> Value {
        json!({
            "id": 7,
            "created_at": "2025-11-08T09:12:44.118202",
            "updated_at": "2025-11-08T09:12:51.004411",
            "extracted_at": "2025-11-08T09:12:51.004411",
            "approved_at": null,
            "status": "extracted",
            "original_filename": "faktura.pdf",
            "file_type": "pdf",
            "file_path": "2025/11/08/abc.pdf",
            "file_size": 48213,
            "raw_ai_data": {
                "invoice_number": "F-2025-11-089",
                "supplier": {"name": "Städ & Service Norrland AB", "org_number": "559012-3456", "address": "Servicevägen 5"},
                "lines": [{
                    "line_number": 1,
                    "description": "Städning kontorslokaler",
                    "amount": 11400,
                    "vat_rate": 25,
                    "vat_amount": 2850,
                    "ai_suggestions": [{"account_number": "6230", "account_name": "Städning och renhållning", "confidence": 0.91, "explanation": "Städtjänster"}],
                    "approved": false
                }],
                "subtotal": 11400,
                "vat_amount": 2850,
                "total": 14250,
                "currency": "SEK",
                "confidence_notes": "sida 1 av 1"
            },
            "user_validated_data": null,
            "error_message": null
        })
    }

    #[test]
    fn deserializes_backend_record() {
        let invoice: Invoice = serde_json::from_value(backend_record()).unwrap();
        assert_eq!(invoice.id, 7);
        assert_eq!(invoice.status, InvoiceStatus::Extracted);
        assert!(invoice.created_at.is_some());
        assert!(invoice.approved_at.is_none());
        assert_eq!(invoice.supplier_name(), Some("Städ & Service Norrland AB"));
        assert_eq!(invoice.total(), Some(Decimal::from(14250)));

        let data = invoice.raw_ai_data.as_ref().unwrap();
        assert_eq!(data.lines.len(), 1);
        assert_eq!(data.extra.get("confidence_notes"), Some(&json!("sida 1 av 1")));
    }

    #[test]
    fn unknown_payload_fields_round_trip() {
        let invoice: Invoice = serde_json::from_value(backend_record()).unwrap();
        let data = serde_json::to_value(invoice.raw_ai_data.unwrap()).unwrap();
        assert_eq!(data["confidence_notes"], json!("sida 1 av 1"));
        assert_eq!(data["lines"][0]["ai_suggestions"][0]["account_number"], json!("6230"));
    }

    #[test]
    fn legacy_failed_status_maps_to_extraction_failed() {
        let status: InvoiceStatus = serde_json::from_value(json!("failed")).unwrap();
        assert_eq!(status, InvoiceStatus::ExtractionFailed);
        assert_eq!(
            serde_json::to_value(status).unwrap(),
            json!("extraction_failed")
        );
        assert_eq!(InvoiceStatus::parse("failed"), Some(InvoiceStatus::ExtractionFailed));
        assert!(serde_json::from_value::<InvoiceStatus>(json!("paid")).is_err());
    }

    #[test]
    fn only_extracted_invoices_are_approvable() {
        for status in InvoiceStatus::ALL {
            assert_eq!(status.is_approvable(), status == InvoiceStatus::Extracted);
            assert_eq!(InvoiceStatus::parse(status.as_str()), Some(status));
        }
        assert!(InvoiceStatus::Approved.is_terminal());
        assert!(!InvoiceStatus::Extracting.is_terminal());
    }

    #[test]
    fn user_validated_data_takes_precedence() {
        let mut record = backend_record();
        record["status"] = json!("approved");
        record["user_validated_data"] = json!({"total": 99, "lines": []});
        let invoice: Invoice = serde_json::from_value(record).unwrap();
        assert_eq!(invoice.total(), Some(Decimal::from(99)));
    }
}
