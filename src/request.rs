//! Filter requests and their validation
//!
//! The wire body is `{"columns": [...], "filterCondition": "..."}`; the
//! target container arrives separately (an HTTP header). Validation
//! short-circuits in a fixed order: container, columns, condition.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FilterError, Result};

/// Request body as received on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRequestBody {
    /// Output columns, in the caller's casing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    /// Boolean WHERE-style expression over logical column names
    #[serde(
        rename = "filterCondition",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub filter_condition: Option<String>,
}

impl FilterRequestBody {
    pub fn new(columns: Vec<String>, filter_condition: impl Into<String>) -> Self {
        Self {
            columns: Some(columns),
            filter_condition: Some(filter_condition.into()),
        }
    }
}

/// A validated filter request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    output_columns: Vec<String>,
    where_condition: String,
}

impl FilterRequest {
    /// Output columns are normalized to uppercase on ingest.
    pub fn new(output_columns: Vec<String>, where_condition: impl Into<String>) -> Self {
        Self {
            output_columns: output_columns
                .into_iter()
                .map(|c| c.to_uppercase())
                .collect(),
            where_condition: where_condition.into(),
        }
    }

    /// Requested output columns, uppercase, in request order
    pub fn output_columns(&self) -> &[String] {
        &self.output_columns
    }

    pub fn where_condition(&self) -> &str {
        &self.where_condition
    }
}

/// A request that passed validation, bound to its container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub container: String,
    pub request: FilterRequest,
}

/// Validate a raw request.
///
/// `body` is the raw JSON payload. Fields are read in validation order, so a
/// payload that is not a JSON object, or whose `columns` is not a list of
/// strings, is reported as unreadable columns; a `filterCondition` that is
/// not a string is reported as a missing condition.
pub fn validate_request(container: Option<&str>, body: &[u8]) -> Result<ValidatedRequest> {
    let container = require_container(container)?;

    let mut fields: Map<String, Value> =
        serde_json::from_slice(body).map_err(FilterError::missing_columns)?;

    let columns = match fields.remove("columns") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            serde_json::from_value::<Vec<String>>(value).map_err(FilterError::missing_columns)?,
        ),
    };

    let filter_condition = match fields.remove("filterCondition") {
        Some(Value::String(condition)) => Some(condition),
        _ => None,
    };

    validate_body(
        container,
        FilterRequestBody {
            columns,
            filter_condition,
        },
    )
}

/// Validate an already-decoded body.
pub fn validate_body(container: String, body: FilterRequestBody) -> Result<ValidatedRequest> {
    let columns = body
        .columns
        .filter(|columns| !columns.is_empty())
        .ok_or_else(|| FilterError::MissingColumns(String::new()))?;

    let condition = body
        .filter_condition
        .filter(|condition| !condition.trim().is_empty())
        .ok_or(FilterError::MissingCondition)?;

    Ok(ValidatedRequest {
        container,
        request: FilterRequest::new(columns, condition),
    })
}

/// Container identifiers must be present and non-blank.
pub fn require_container(container: Option<&str>) -> Result<String> {
    container
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .ok_or(FilterError::MissingContainer)
}
