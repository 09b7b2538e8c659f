//! Error types for the filter pipeline and the store gateway

use thiserror::Error;

/// Failure of one pipeline stage.
///
/// Each variant corresponds to exactly one stage and carries the diagnostic
/// text that ends up in `statusAPI.message`. The numeric code is only
/// attached at the envelope boundary via [`FilterError::code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Cannot read container name from the header")]
    MissingContainer,

    #[error("Cannot read column list from the request body{0}")]
    MissingColumns(String),

    #[error("Cannot read where condition from the request body")]
    MissingCondition,

    #[error("Getting the document store client returned with an error: {0}")]
    StoreClient(String),

    #[error("Getting the where condition's columns returned with an error: {0}")]
    ConditionParse(String),

    #[error("Getting the list of columns to be selected returned with an error: {0}")]
    ColumnSet(String),

    #[error("Where condition pre-processing failed with error: {0}")]
    ConditionQualify(String),

    #[error("Select columns pre-processing failed with error: {0}")]
    SelectQualify(String),

    #[error("Query to the document store failed with an error: {0}")]
    QueryExecution(String),

    #[error("Filtering result's columns failed with an error: {0}")]
    Projection(String),

    #[error("Result exceeds the limit of {0} records")]
    ResultLimit(usize),

    #[error("Generating Json result failed with an error: {0}")]
    Serialization(String),
}

impl FilterError {
    /// Stable numeric code reported in `statusAPI.code`.
    pub fn code(&self) -> u16 {
        match self {
            Self::MissingContainer => 9000,
            Self::MissingColumns(_) => 9001,
            Self::MissingCondition => 9002,
            Self::StoreClient(_) => 9003,
            Self::ConditionParse(_) => 9004,
            Self::ColumnSet(_) => 9005,
            Self::ConditionQualify(_) => 9006,
            Self::SelectQualify(_) => 9007,
            Self::QueryExecution(_) => 9008,
            Self::Projection(_) => 9009,
            Self::ResultLimit(_) => 9010,
            Self::Serialization(_) => 9011,
        }
    }

    pub fn missing_columns(detail: impl std::fmt::Display) -> Self {
        Self::MissingColumns(format!(": {}", detail))
    }

    pub fn condition_parse(msg: impl Into<String>) -> Self {
        Self::ConditionParse(msg.into())
    }

    pub fn column_set(msg: impl Into<String>) -> Self {
        Self::ColumnSet(msg.into())
    }

    pub fn condition_qualify(msg: impl Into<String>) -> Self {
        Self::ConditionQualify(msg.into())
    }

    pub fn select_qualify(msg: impl Into<String>) -> Self {
        Self::SelectQualify(msg.into())
    }

    pub fn projection(msg: impl Into<String>) -> Self {
        Self::Projection(msg.into())
    }
}

/// Errors raised by a store gateway while connecting or querying
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid container: {0}")]
    InvalidContainer(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Unexpected record shape: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_stage_order() {
        let errors = [
            FilterError::MissingContainer,
            FilterError::missing_columns("x"),
            FilterError::MissingCondition,
            FilterError::StoreClient("x".into()),
            FilterError::condition_parse("x"),
            FilterError::column_set("x"),
            FilterError::condition_qualify("x"),
            FilterError::select_qualify("x"),
            FilterError::QueryExecution("x".into()),
            FilterError::projection("x"),
            FilterError::ResultLimit(1000),
            FilterError::Serialization("x".into()),
        ];

        let codes: Vec<u16> = errors.iter().map(FilterError::code).collect();
        assert_eq!(codes, (9000..=9011).collect::<Vec<u16>>());
    }

    #[test]
    fn test_messages_carry_detail() {
        assert_eq!(
            FilterError::ResultLimit(1000).to_string(),
            "Result exceeds the limit of 1000 records"
        );
        assert_eq!(
            FilterError::missing_columns("expected a sequence").to_string(),
            "Cannot read column list from the request body: expected a sequence"
        );
        assert_eq!(
            FilterError::MissingColumns(String::new()).to_string(),
            "Cannot read column list from the request body"
        );
        assert!(
            FilterError::condition_parse("Expected: an expression")
                .to_string()
                .ends_with("Expected: an expression")
        );
    }

    #[test]
    fn test_store_error_from_sqlx() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(err.to_string().starts_with("SQL error:"));
    }
}
