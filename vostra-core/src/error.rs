use serde_json::Value;
use thiserror::Error;

/// Shown whenever a request never reached the backend or never got a response.
pub const TRANSPORT_ERROR_MESSAGE: &str =
    "Kan inte nå servern. Kontrollera din anslutning och försök igen.";

/// Raw response bodies longer than this are never shown to the user.
const MAX_RAW_MESSAGE_LEN: usize = 200;

/// Every failure the API layer can report, carrying a message that is ready
/// for direct display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Input rejected before any network call was made.
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    NotFound { message: String },

    /// Non-2xx response other than 404.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// DNS failure, refused connection, timeout or a dropped response.
    #[error("{message}")]
    Transport { message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        ApiError::NotFound {
            message: status_message(404).to_string(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        ApiError::Server {
            status,
            message: message.into(),
        }
    }

    pub fn transport() -> Self {
        ApiError::Transport {
            message: TRANSPORT_ERROR_MESSAGE.to_string(),
        }
    }

    /// Normalize a non-2xx response.
    ///
    /// The message is resolved in priority order: a structured error body,
    /// then a short plain-text body, then a static message for the status code.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = structured_message(body)
            .or_else(|| raw_message(body))
            .unwrap_or_else(|| status_message(status).to_string());

        if status == 404 {
            ApiError::NotFound { message }
        } else {
            ApiError::Server { status, message }
        }
    }

    /// A 2xx response whose body did not match the expected shape.
    pub fn unexpected_body(status: u16) -> Self {
        ApiError::Server {
            status,
            message: "Oväntat svar från servern.".to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { message }
            | ApiError::NotFound { message }
            | ApiError::Server { message, .. }
            | ApiError::Transport { message } => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Validation { .. } | ApiError::Transport { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Server { .. } => "server",
            ApiError::Transport { .. } => "transport",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        tracing::warn!(
            error = %err,
            is_timeout = err.is_timeout(),
            is_connect = err.is_connect(),
            "Invoice API transport failure"
        );
        ApiError::transport()
    }
}

/// Static message per status code, used when the body carries nothing useful.
pub fn status_message(status: u16) -> &'static str {
    match status {
        400 => "Ogiltig förfrågan.",
        401 => "Du är inte inloggad.",
        403 => "Du saknar behörighet för den här åtgärden.",
        404 => "Fakturan hittades inte.",
        408 => "Servern svarade inte i tid. Försök igen.",
        409 => "Åtgärden kan inte utföras i fakturans nuvarande status.",
        413 => "Filen är för stor.",
        415 => "Filtypen stöds inte.",
        422 => "Uppgifterna kunde inte valideras.",
        429 => "För många förfrågningar. Vänta en stund och försök igen.",
        500..=599 => "Serverfel. Försök igen om en stund.",
        _ => "Något gick fel.",
    }
}

fn structured_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    if let Some(detail) = object.get("detail") {
        match detail {
            Value::String(text) => return non_empty(text),
            // Validation errors arrive as a list of {loc, msg, type} entries.
            Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str).or(item.as_str()))
                    .map(str::trim)
                    .filter(|msg| !msg.is_empty())
                    .collect();
                if !messages.is_empty() {
                    return Some(messages.join("; "));
                }
            }
            _ => {}
        }
    }

    ["message", "error"]
        .iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .find_map(non_empty)
}

fn raw_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty()
        || trimmed.starts_with('<')
        || trimmed.chars().count() > MAX_RAW_MESSAGE_LEN
    {
        return None;
    }
    // A JSON document without a recognised message field is not display text.
    if serde_json::from_str::<Value>(trimmed)
        .map(|value| value.is_object() || value.is_array())
        .unwrap_or(false)
    {
        return None;
    }
    Some(trimmed.to_string())
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Precondition violations in the review model. State is left untouched
/// whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("Rad {0} finns inte på fakturan.")]
    UnknownLine(u32),

    #[error("Rad {0} saknar kontoförslag att godkänna.")]
    NothingToApprove(u32),

    #[error("Ett konto måste anges för rad {0}.")]
    EmptyAccount(u32),
}
