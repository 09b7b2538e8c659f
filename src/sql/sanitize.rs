//! SQL Identifier Sanitization Utilities
//!
//! Container names and select columns are the only caller-supplied identifiers
//! that get spliced into query text; both are validated here before use.

use std::sync::LazyLock;

use regex::Regex;

/// Longest container name the store accepts
pub const MAX_CONTAINER_NAME_LEN: usize = 255;

static COLUMN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z_][A-Z0-9_]*$").expect("column pattern is valid"));

static RECORD_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("alias pattern is valid"));

static CONTAINER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("container pattern is valid"));

/// Quote a SQL identifier to make it safe for use in queries
///
/// # Example
/// ```
/// use docstore_filter::sql::quote_identifier;
///
/// assert_eq!(quote_identifier("people"), "\"people\"");
/// assert_eq!(quote_identifier("NAME"), "\"NAME\"");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
    // Escape any double quotes in the identifier by doubling them
    let escaped = identifier.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// Validate a canonical (uppercase) logical column name
///
/// Rules:
/// - Must start with an uppercase letter or underscore
/// - Can only contain uppercase letters, digits, and underscores
///
/// # Example
/// ```
/// use docstore_filter::sql::validate_column_name;
///
/// assert!(validate_column_name("FIRST_NAME").is_ok());
/// assert!(validate_column_name("NAME; DROP").is_err());
/// ```
pub fn validate_column_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Column name cannot be empty".to_string());
    }

    if !COLUMN_NAME.is_match(name) {
        return Err(format!(
            "Column '{}' is invalid. Must start with a letter or underscore and contain only letters, numbers, and underscores.",
            name
        ));
    }

    Ok(())
}

/// Validate a record alias.
///
/// The alias is spliced unquoted in front of every column, so it must be a
/// plain identifier.
pub fn validate_record_alias(alias: &str) -> Result<(), String> {
    if !RECORD_ALIAS.is_match(alias) {
        return Err(format!(
            "Record alias '{}' is invalid. Must start with a letter or underscore and contain only letters, numbers, and underscores.",
            alias
        ));
    }

    Ok(())
}

/// Validate a container name
///
/// Rules:
/// - Must start with a letter or digit
/// - Can only contain letters, digits, underscores, and hyphens
/// - At most [`MAX_CONTAINER_NAME_LEN`] characters
pub fn validate_container_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Container name cannot be empty".to_string());
    }

    if name.len() > MAX_CONTAINER_NAME_LEN {
        return Err(format!(
            "Container name is longer than {} characters",
            MAX_CONTAINER_NAME_LEN
        ));
    }

    if !CONTAINER_NAME.is_match(name) {
        return Err(format!(
            "Container '{}' is invalid. Must start with a letter or digit and contain only letters, numbers, underscores, and hyphens.",
            name
        ));
    }

    Ok(())
}
