//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic input failures (validation, malformed
/// identifiers). Storage and authentication concerns have their own types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. out-of-range field).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

/// Check that a trimmed string field has a character count within `min..=max`.
pub fn ensure_len(field: &str, value: &str, min: usize, max: usize) -> DomainResult<()> {
    let len = value.chars().count();
    if value.trim().is_empty() && min > 0 {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    if len < min || len > max {
        return Err(DomainError::validation(format!(
            "{field} must be between {min} and {max} characters (got {len})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_len_accepts_bounds() {
        assert!(ensure_len("name", "abc", 3, 5).is_ok());
        assert!(ensure_len("name", "abcde", 3, 5).is_ok());
    }

    #[test]
    fn ensure_len_rejects_blank_and_out_of_range() {
        assert!(matches!(ensure_len("name", "   ", 1, 5), Err(DomainError::Validation(_))));
        assert!(matches!(ensure_len("name", "ab", 3, 5), Err(DomainError::Validation(_))));
        assert!(matches!(ensure_len("name", "abcdef", 3, 5), Err(DomainError::Validation(_))));
    }

    #[test]
    fn ensure_len_counts_chars_not_bytes() {
        assert!(ensure_len("name", "äöü", 3, 3).is_ok());
    }
}
