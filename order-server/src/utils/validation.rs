//! Input validation helpers
//!
//! Centralized text length constants and validation functions. Limits are
//! chosen as reasonable UX bounds; the document store itself enforces
//! nothing.

use rust_decimal::Decimal;

use shared::error::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, category, item, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions and other free text.
pub const MAX_TEXT_LEN: usize = 500;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Delivery locations / addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Upper bound for list endpoints regardless of the requested limit.
pub const MAX_LIST_LIMIT: usize = 100;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate that a monetary amount is strictly positive.
pub fn validate_positive_amount(value: Decimal, field: &str) -> Result<(), AppError> {
    if value <= Decimal::ZERO {
        return Err(AppError::validation(format!("{field} must be positive")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_rejects_blank() {
        assert!(validate_required_text("  ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("ok", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn test_required_text_rejects_overlong() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required_text(&long, "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_optional_text_allows_none() {
        assert!(validate_optional_text(&None, "note", MAX_TEXT_LEN).is_ok());
        let long = Some("x".repeat(MAX_TEXT_LEN + 1));
        assert!(validate_optional_text(&long, "note", MAX_TEXT_LEN).is_err());
    }

    #[test]
    fn test_positive_amount() {
        assert!(validate_positive_amount(Decimal::new(1, 2), "price").is_ok());
        assert!(validate_positive_amount(Decimal::ZERO, "price").is_err());
        assert!(validate_positive_amount(Decimal::new(-100, 2), "price").is_err());
    }
}
