//! SQL utilities for filter translation
//!
//! Condition parsing and qualification, select-set reconciliation, query
//! assembly, and identifier sanitization.

pub mod columns;
pub mod condition;
pub mod query;
pub mod sanitize;

pub use columns::{QualifiedColumn, SelectColumnSet};
pub use condition::{Condition, extract_condition_columns};
pub use query::{DocumentQuery, Projection, build_filter_query};
pub use sanitize::{
    quote_identifier, validate_column_name, validate_container_name, validate_record_alias,
};
