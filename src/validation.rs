//! Input validation for plan building
//!
//! Identifier checks for anything that is interpolated into SQL text
//! (table names, column names, aliases) and argument checks for pagination.

use crate::constants::MAX_IDENTIFIER_LENGTH;
use crate::error::{LoaderError, Result};

/// Validates a bare SQL identifier (`posts`, `user_id`, `subquery`)
pub fn validate_identifier(argument: &str, ident: &str) -> Result<()> {
    if ident.is_empty() {
        return Err(LoaderError::invalid_argument(argument, "must not be blank"));
    }

    if ident.len() > MAX_IDENTIFIER_LENGTH {
        return Err(LoaderError::invalid_argument(
            argument,
            format!(
                "identifier too long: {} chars (max: {MAX_IDENTIFIER_LENGTH})",
                ident.len()
            ),
        ));
    }

    let mut chars = ident.chars();
    let leading_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !leading_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(LoaderError::invalid_argument(
            argument,
            format!("'{ident}' is not a valid identifier"),
        ));
    }

    Ok(())
}

/// Validates a possibly table-qualified column (`posts.created_at`)
pub fn validate_column_path(argument: &str, path: &str) -> Result<()> {
    let mut parts = path.split('.');
    let (Some(first), second, None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(LoaderError::invalid_argument(
            argument,
            format!("'{path}' has too many qualifiers"),
        ));
    };

    validate_identifier(argument, first)?;
    if let Some(column) = second {
        validate_identifier(argument, column)?;
    }

    Ok(())
}

/// Validates a pagination argument that must be zero or greater
pub fn validate_non_negative(argument: &str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(LoaderError::invalid_argument(
            argument,
            format!("must not be negative (got {value})"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_identifier("table", "posts").is_ok());
        assert!(validate_identifier("table", "_private_2").is_ok());
    }

    #[test]
    fn test_rejects_injection_attempts() {
        let err = validate_identifier("column", "id; DROP TABLE posts").unwrap_err();
        assert_eq!(err.argument(), Some("column"));
        assert!(validate_identifier("column", "1abc").is_err());
        assert!(validate_identifier("column", "").is_err());
    }

    #[test]
    fn test_identifier_length_limit() {
        let long = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert!(validate_identifier("alias", &long).is_err());
        assert!(validate_identifier("alias", &long[1..]).is_ok());
    }

    #[test]
    fn test_column_paths() {
        assert!(validate_column_path("sort", "posts.created_at").is_ok());
        assert!(validate_column_path("sort", "created_at").is_ok());
        assert!(validate_column_path("sort", "public.posts.id").is_err());
        assert!(validate_column_path("sort", "posts.").is_err());
    }

    #[test]
    fn test_non_negative() {
        assert!(validate_non_negative("after", 0).is_ok());
        let err = validate_non_negative("last", -2).unwrap_err();
        assert_eq!(err.argument(), Some("last"));
    }
}
