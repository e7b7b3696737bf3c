//! Invoice line items and their AI account suggestions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One billable row of an invoice, reviewed independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// 1-based, unique within the invoice.
    pub line_number: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    pub amount: Decimal,
    #[serde(default)]
    pub vat_rate: Decimal,
    #[serde(default)]
    pub vat_amount: Decimal,
    /// Ranked by the backend; only treated as a default when non-empty.
    #[serde(default)]
    pub ai_suggestions: Vec<AiSuggestion>,
    /// Reviewer's choice, overriding every suggestion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_account: Option<String>,
    #[serde(default)]
    pub approved: bool,
}

impl LineItem {
    /// The account that would be used if the line were approved now.
    pub fn effective_account(&self) -> Option<&str> {
        self.user_account
            .as_deref()
            .filter(|account| !account.trim().is_empty())
            .or_else(|| self.default_suggestion().map(|s| s.account_number.as_str()))
    }

    pub fn default_suggestion(&self) -> Option<&AiSuggestion> {
        self.ai_suggestions.first()
    }

    /// The suggestion matching the effective account, if any.
    pub fn selected_suggestion(&self) -> Option<&AiSuggestion> {
        let account = self.effective_account()?;
        self.ai_suggestions
            .iter()
            .find(|s| s.account_number == account)
    }

    pub fn has_suggestions(&self) -> bool {
        !self.ai_suggestions.is_empty()
    }
}

/// A candidate accounting classification for a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSuggestion {
    pub account_number: String,
    #[serde(default)]
    pub account_name: String,
    /// In `[0, 1]`.
    pub confidence: f64,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xai: Option<Explainability>,
}

impl AiSuggestion {
    pub fn tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_confidence(self.confidence)
    }

    /// Confidence as a whole percentage, clamped to 0..=100.
    pub fn percent(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

/// Why the model proposed a suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explainability {
    #[serde(default)]
    pub matched_words: Vec<String>,
    /// Number of similar historical lines booked to this account.
    #[serde(default)]
    pub similar_history: u32,
    pub uncertainty: Uncertainty,
    #[serde(default)]
    pub basis: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Uncertainty {
    #[serde(rename = "låg", alias = "low")]
    Low,
    #[serde(rename = "medel", alias = "medium")]
    Medium,
    #[serde(rename = "hög", alias = "high")]
    High,
}

impl Uncertainty {
    pub fn label(&self) -> &'static str {
        match self {
            Uncertainty::Low => "låg",
            Uncertainty::Medium => "medel",
            Uncertainty::High => "hög",
        }
    }
}

/// Display bands for suggestion confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.9 {
            ConfidenceTier::High
        } else if confidence >= 0.7 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
        }
    }
}
