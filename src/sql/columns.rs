//! Select-column reconciliation and qualification

use std::fmt;

use indexmap::IndexSet;

use crate::error::{FilterError, Result};
use crate::sql::sanitize::validate_column_name;

/// Union of the requested output columns and the columns a condition
/// references. Output columns come first, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectColumnSet {
    columns: IndexSet<String>,
}

impl SelectColumnSet {
    /// Reconcile output columns (already uppercased) with condition columns.
    ///
    /// A blank output column cannot be selected and fails the reconciliation.
    pub fn reconcile<'a>(
        output_columns: &'a [String],
        condition_columns: impl IntoIterator<Item = &'a String>,
    ) -> Result<Self> {
        if let Some(pos) = output_columns.iter().position(|c| c.trim().is_empty()) {
            return Err(FilterError::column_set(format!(
                "output column at position {} is blank",
                pos
            )));
        }

        let columns = output_columns
            .iter()
            .chain(condition_columns)
            .cloned()
            .collect();

        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Qualify every column with the record alias.
    pub fn qualify(&self, alias: &str) -> Result<Vec<QualifiedColumn>> {
        self.iter()
            .map(|column| QualifiedColumn::new(alias, column))
            .collect()
    }
}

/// A logical column prefixed with the store's record alias. Only ever
/// rendered into query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedColumn {
    alias: String,
    name: String,
}

impl QualifiedColumn {
    /// Qualify `name`, which must be a plain uppercase identifier so it can be
    /// spliced into the query text.
    pub fn new(alias: &str, name: &str) -> Result<Self> {
        validate_column_name(name).map_err(FilterError::select_qualify)?;
        Ok(Self {
            alias: alias.to_string(),
            name: name.to_string(),
        })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The bare logical column name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for QualifiedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.alias, self.name)
    }
}

/// Render qualified columns as the comma-separated select list.
pub fn join_select_list(columns: &[QualifiedColumn]) -> String {
    columns
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
