//! # Validation Module
//!
//! Input validation utilities for Vitrina.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI glue (outside this workspace)                             │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any I/O runs)                            │
//! │  ├── Rating bounds, comment length                                     │
//! │  └── Page size and user id sanity                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Remote store rules (collaborator's concern)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_COMMENT_LEN, MAX_PAGE_SIZE, MAX_RATING, MIN_RATING};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a review star rating.
///
/// ## Rules
/// - Must be between 1 and 5 inclusive
pub fn validate_rating(rating: u8) -> ValidationResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: MIN_RATING as i64,
            max: MAX_RATING as i64,
        });
    }
    Ok(())
}

/// Validates a catalog page size.
///
/// ## Rules
/// - Must be at least 1 (a zero page never terminates pagination)
/// - Must be at most [`MAX_PAGE_SIZE`]
pub fn validate_page_size(page_size: usize) -> ValidationResult<()> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ValidationError::OutOfRange {
            field: "page_size".to_string(),
            min: 1,
            max: MAX_PAGE_SIZE as i64,
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a review comment.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most [`MAX_COMMENT_LEN`] characters
///
/// ## Returns
/// The trimmed comment.
pub fn validate_comment(comment: &str) -> ValidationResult<String> {
    let comment = comment.trim();

    if comment.is_empty() {
        return Err(ValidationError::Required {
            field: "comment".to_string(),
        });
    }

    if comment.chars().count() > MAX_COMMENT_LEN {
        return Err(ValidationError::TooLong {
            field: "comment".to_string(),
            max: MAX_COMMENT_LEN,
        });
    }

    Ok(comment.to_string())
}

/// Validates a user id handed in from the auth glue.
///
/// ## Rules
/// - Must not be empty or whitespace (an empty id would address the remote
///   store at an undefined path)
pub fn validate_user_id(user_id: &str) -> ValidationResult<()> {
    if user_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "user_id".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(validate_page_size(1).is_ok());
        assert!(validate_page_size(30).is_ok());
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(MAX_PAGE_SIZE + 1).is_err());
    }

    #[test]
    fn test_comment_trimmed_and_bounded() {
        assert_eq!(validate_comment("  great kettle  ").unwrap(), "great kettle");
        assert!(validate_comment("   ").is_err());
        assert!(validate_comment(&"x".repeat(MAX_COMMENT_LEN + 1)).is_err());
    }

    #[test]
    fn test_user_id_must_be_present() {
        assert!(validate_user_id("user-1").is_ok());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("   ").is_err());
    }
}
