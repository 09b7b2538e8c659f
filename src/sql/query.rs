//! Query assembly
//!
//! A [`DocumentQuery`] keeps its parts separate so each gateway can render the
//! FROM target its own way. `Display` gives the document-store form
//! `SELECT c.NAME,c.AGE FROM c WHERE c.AGE > 30`.

use std::fmt;

use tracing::debug;

use crate::error::Result;
use crate::request::FilterRequest;
use crate::sql::columns::{QualifiedColumn, SelectColumnSet, join_select_list};
use crate::sql::condition::Condition;

/// What a query selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Every field of the record (`SELECT *`)
    All,
    /// Explicit qualified columns
    Columns(Vec<QualifiedColumn>),
}

/// A query against a single container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    alias: String,
    projection: Projection,
    condition: Option<String>,
    limit: Option<u32>,
}

impl DocumentQuery {
    /// Build `SELECT <cols> FROM <alias> [WHERE <cond>]`.
    ///
    /// An empty condition omits the WHERE clause entirely.
    pub fn select(
        alias: impl Into<String>,
        columns: Vec<QualifiedColumn>,
        condition: impl Into<String>,
    ) -> Self {
        let condition = condition.into();
        Self {
            alias: alias.into(),
            projection: Projection::Columns(columns),
            condition: (!condition.trim().is_empty()).then_some(condition),
            limit: None,
        }
    }

    /// `SELECT * FROM <alias> OFFSET 0 LIMIT 1`
    pub fn sample(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            projection: Projection::All,
            condition: None,
            limit: Some(1),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Select list in document-store form (`c.NAME,c.AGE` or `*`)
    pub fn select_list(&self) -> String {
        match &self.projection {
            Projection::All => "*".to_string(),
            Projection::Columns(columns) => join_select_list(columns),
        }
    }
}

impl fmt::Display for DocumentQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.select_list(), self.alias)?;
        if let Some(condition) = &self.condition {
            write!(f, " WHERE {}", condition)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " OFFSET 0 LIMIT {}", limit)?;
        }
        Ok(())
    }
}

/// Translate a validated filter request into a query.
///
/// Runs condition-column extraction, select-set reconciliation, condition and
/// select qualification, then assembly. Each step fails with its own error
/// variant.
pub fn build_filter_query(request: &FilterRequest, alias: &str) -> Result<DocumentQuery> {
    let condition = Condition::parse(request.where_condition())?;
    let condition_columns = condition.columns(alias);

    let select_set = SelectColumnSet::reconcile(request.output_columns(), &condition_columns)?;
    let qualified_condition = condition.qualify(alias)?;
    let qualified_columns = select_set.qualify(alias)?;

    let query = DocumentQuery::select(alias, qualified_columns, qualified_condition);
    debug!(query = %query, "Built document query");

    Ok(query)
}
