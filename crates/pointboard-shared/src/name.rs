//! User name validation.
//!
//! Names are trimmed of surrounding whitespace and must be 2--50 characters
//! long after trimming.  Uniqueness is enforced by the store, not here.

use thiserror::Error;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 50;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Name must be at least {NAME_MIN_LEN} characters long")]
    TooShort,

    #[error("Name cannot exceed {NAME_MAX_LEN} characters")]
    TooLong,
}

/// Trim a raw name and enforce the length bounds.  Returns the trimmed name.
pub fn normalize_name(raw: &str) -> Result<String, NameError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();

    if len < NAME_MIN_LEN {
        return Err(NameError::TooShort);
    }
    if len > NAME_MAX_LEN {
        return Err(NameError::TooLong);
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_two_char_lower_bound() {
        assert_eq!(normalize_name("Al").unwrap(), "Al");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize_name("  Al  ").unwrap(), "Al");
    }

    #[test]
    fn rejects_single_char() {
        assert_eq!(normalize_name("A"), Err(NameError::TooShort));
    }

    #[test]
    fn rejects_empty_and_whitespace_only() {
        assert_eq!(normalize_name(""), Err(NameError::TooShort));
        assert_eq!(normalize_name("   "), Err(NameError::TooShort));
    }

    #[test]
    fn accepts_fifty_chars_rejects_fifty_one() {
        let fifty = "x".repeat(50);
        assert_eq!(normalize_name(&fifty).unwrap(), fifty);

        let fifty_one = "x".repeat(51);
        assert_eq!(normalize_name(&fifty_one), Err(NameError::TooLong));
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        // 50 two-byte characters is still within bounds.
        let name = "é".repeat(50);
        assert!(normalize_name(&name).is_ok());
    }
}
