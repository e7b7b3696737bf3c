//! Client-side checks for invoice uploads, run before any network call.

use crate::api::UploadFile;
use crate::error::ApiError;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// `image/jpg` is not a registered type but some browsers still send it.
pub const ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["application/pdf", "image/png", "image/jpeg", "image/jpg"];

const MAX_FILE_NAME_LEN: usize = 255;

pub fn validate_upload(file: &UploadFile, max_bytes: usize) -> Result<(), ApiError> {
    let content_type = file
        .content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(ApiError::validation(
            "Ogiltig filtyp. Endast PDF, PNG och JPG tillåts.",
        ));
    }
    if file.size() == 0 {
        return Err(ApiError::validation("Filen är tom."));
    }
    if file.size() > max_bytes {
        return Err(file_too_large(max_bytes));
    }
    Ok(())
}

pub fn file_too_large(max_bytes: usize) -> ApiError {
    ApiError::validation(format!(
        "Filen är för stor. Max storlek är {} MB.",
        max_bytes / (1024 * 1024)
    ))
}

/// Strips path separators and NUL bytes and caps the length, keeping the
/// extension.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| *c != '\0')
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();

    if cleaned.chars().count() <= MAX_FILE_NAME_LEN {
        return cleaned;
    }

    let extension = cleaned
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| ext.chars().count() < 10)
        .unwrap_or_default();
    let stem_len = MAX_FILE_NAME_LEN - extension.chars().count() - 1;
    let stem: String = cleaned.chars().take(stem_len).collect();
    if extension.is_empty() {
        cleaned.chars().take(MAX_FILE_NAME_LEN).collect()
    } else {
        format!("{stem}.{extension}")
    }
}
