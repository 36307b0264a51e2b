//! Input validation functions
//!
//! Usernames are checked before any store lookup; SQL identifiers coming
//! from configuration are checked once at startup because they are spliced
//! into query text.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Longest username accepted for lookup, in bytes
///
/// Longer names, and names with control characters, are reported as unknown
/// without querying the store. A stored account whose name breaks these
/// rules can never log in.
pub const MAX_USERNAME_LEN: usize = 255;

/// Longest identifier PostgreSQL accepts without truncation
pub const MAX_IDENTIFIER_LEN: usize = 63;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Validate a username supplied for authentication
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err("Username too long".to_string());
    }
    if username.chars().any(char::is_control) {
        return Err("Username contains control characters".to_string());
    }
    Ok(())
}

/// Validate a table or column name
///
/// Accepts a bare identifier or a `schema.table` pair.
pub fn validate_sql_identifier(ident: &str) -> Result<(), String> {
    if ident.is_empty() {
        return Err("Identifier cannot be empty".to_string());
    }
    let parts: Vec<&str> = ident.split('.').collect();
    if parts.len() > 2 {
        return Err(format!("Identifier {:?} has too many parts", ident));
    }
    for part in parts {
        if part.len() > MAX_IDENTIFIER_LEN {
            return Err(format!("Identifier {:?} is too long", ident));
        }
        if !IDENTIFIER.is_match(part) {
            return Err(format!("Identifier {:?} is not a plain SQL name", ident));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("bob").is_ok());
        assert!(validate_username("Bob.Smith@example.com").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("bad\nname").is_err());
        assert!(validate_username(&"a".repeat(256)).is_err());
    }

    #[test]
    fn test_username_limit_counts_bytes() {
        assert!(validate_username(&"a".repeat(MAX_USERNAME_LEN)).is_ok());
        // 128 two-byte characters
        assert!(validate_username(&"é".repeat(128)).is_err());
        assert!(validate_username("tab\tname").is_err());
    }

    #[rstest]
    #[case("users")]
    #[case("user_roles")]
    #[case("_private")]
    #[case("auth.users")]
    #[case("Role2")]
    fn test_valid_identifiers(#[case] ident: &str) {
        assert!(validate_sql_identifier(ident).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("1users")]
    #[case("users; DROP TABLE users")]
    #[case("users--")]
    #[case("\"users\"")]
    #[case("a.b.c")]
    #[case("auth.")]
    fn test_invalid_identifiers(#[case] ident: &str) {
        assert!(validate_sql_identifier(ident).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_plain_identifiers_accepted(ident in "[a-z_][a-z0-9_]{0,62}") {
            prop_assert!(validate_sql_identifier(&ident).is_ok());
        }

        #[test]
        fn prop_identifiers_with_punctuation_rejected(
            head in "[a-z]{1,10}",
            punct in "[ ;'\"()*=-]",
            tail in "[a-z]{0,10}",
        ) {
            let ident = format!("{}{}{}", head, punct, tail);
            prop_assert!(validate_sql_identifier(&ident).is_err());
        }
    }
}
