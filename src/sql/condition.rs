//! Filter condition parsing and rewriting
//!
//! A caller's WHERE clause is parsed once with a real SQL grammar. The parsed
//! predicate is then used twice: to discover which logical columns it
//! references, and to re-render it with every column qualified by the store's
//! record alias.

use std::ops::ControlFlow;

use indexmap::IndexSet;
use sqlparser::ast::{
    Expr, Ident, SetExpr, Statement, Value, visit_expressions, visit_expressions_mut,
};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::error::{FilterError, Result};

/// Table name used in the synthetic statement wrapped around a condition
pub const PLACEHOLDER_TABLE: &str = "temp_tbl_nm";

const SQL_RECURSION_LIMIT: usize = 128;

/// A parsed boolean predicate over logical column names
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    expr: Expr,
}

impl Condition {
    /// Parse a WHERE-clause string.
    ///
    /// The clause is wrapped as `SELECT * FROM temp_tbl_nm WHERE <clause>` so
    /// the full statement grammar applies. Anything that does not reduce to
    /// exactly one such statement (a second statement, a trailing ORDER BY or
    /// LIMIT, a set operation) is rejected.
    pub fn parse(clause: &str) -> Result<Self> {
        let sql = synthetic_statement(clause);
        let dialect = GenericDialect {};

        let statements = Parser::new(&dialect)
            .with_recursion_limit(SQL_RECURSION_LIMIT)
            .try_with_sql(&sql)
            .and_then(|mut parser| parser.parse_statements())
            .map_err(|e| FilterError::condition_parse(e.to_string()))?;

        let [statement] = statements.as_slice() else {
            return Err(FilterError::condition_parse(
                "expected a single boolean predicate",
            ));
        };

        let selection = match statement {
            Statement::Query(query) => match query.body.as_ref() {
                SetExpr::Select(select) => select.selection.clone(),
                _ => None,
            },
            _ => None,
        }
        .ok_or_else(|| FilterError::condition_parse("expected a single boolean predicate"))?;

        // Trailing clauses survive parsing but change the rendered statement.
        if statement.to_string() != synthetic_statement(&selection.to_string()) {
            return Err(FilterError::condition_parse(
                "unexpected clauses after the filter condition",
            ));
        }

        Ok(Self { expr: selection })
    }

    /// The parsed predicate
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Distinct logical columns referenced by the predicate, uppercased, in
    /// order of first appearance.
    pub fn columns(&self, alias: &str) -> IndexSet<String> {
        let mut columns = IndexSet::new();
        let _ = visit_expressions(&self.expr, |expr| {
            if let Some(column) = referenced_column(expr, alias) {
                columns.insert(column);
            }
            ControlFlow::<()>::Continue(())
        });
        columns
    }

    /// Render the predicate with every column reference qualified as
    /// `alias.COLUMN`.
    ///
    /// Literal values pass through untouched, except that a double-quoted
    /// string is re-rendered single-quoted. Whitespace is normalized by the
    /// re-rendering, so `AGE>30` and `AGE  >  30` both become `c.AGE > 30`.
    pub fn qualify(&self, alias: &str) -> Result<String> {
        let mut expr = self.expr.clone();

        let flow = visit_expressions_mut(&mut expr, |expr| -> ControlFlow<FilterError> {
            match expr {
                Expr::Subquery(_) | Expr::InSubquery { .. } | Expr::Exists { .. } => {
                    return ControlFlow::Break(FilterError::condition_qualify(
                        "subqueries are not supported in filter conditions",
                    ));
                }
                Expr::Identifier(ident) if ident.quote_style.is_none() => {
                    let column = ident.value.to_uppercase();
                    *expr = Expr::CompoundIdentifier(vec![Ident::new(alias), Ident::new(column)]);
                }
                Expr::Identifier(ident) if ident.quote_style == Some('"') => {
                    let literal = std::mem::take(&mut ident.value);
                    *expr = Expr::Value(Value::SingleQuotedString(literal).into());
                }
                Expr::CompoundIdentifier(parts) => normalize_path(parts, alias),
                _ => {}
            }
            ControlFlow::Continue(())
        });

        if let ControlFlow::Break(err) = flow {
            return Err(err);
        }

        Ok(expr.to_string())
    }
}

/// Parse `clause` and return the logical columns it references.
pub fn extract_condition_columns(clause: &str, alias: &str) -> Result<IndexSet<String>> {
    Ok(Condition::parse(clause)?.columns(alias))
}

fn synthetic_statement(clause: &str) -> String {
    format!("SELECT * FROM {} WHERE {}", PLACEHOLDER_TABLE, clause)
}

/// Column named by an identifier node, if any.
///
/// Quoted identifiers are string literals in the document dialect. For a
/// compound identifier the column is the part right after the alias when the
/// path is already qualified, otherwise the head of the property path.
fn referenced_column(expr: &Expr, alias: &str) -> Option<String> {
    match expr {
        Expr::Identifier(ident) if ident.quote_style.is_none() => Some(ident.value.to_uppercase()),
        Expr::CompoundIdentifier(parts) => {
            let column = match parts.as_slice() {
                [head, column, ..] if head.value.eq_ignore_ascii_case(alias) => column,
                [head, ..] => head,
                [] => return None,
            };
            column
                .quote_style
                .is_none()
                .then(|| column.value.to_uppercase())
        }
        _ => None,
    }
}

/// Qualify a property path in place, uppercasing its column part.
fn normalize_path(parts: &mut Vec<Ident>, alias: &str) {
    let Some(head) = parts.first() else {
        return;
    };

    if parts.len() > 1 && head.value.eq_ignore_ascii_case(alias) {
        parts[0] = Ident::new(alias);
    } else if head.quote_style.is_none() {
        parts.insert(0, Ident::new(alias));
    } else {
        return;
    }

    if parts[1].quote_style.is_none() {
        parts[1].value = parts[1].value.to_uppercase();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(clause: &str) -> Vec<String> {
        extract_condition_columns(clause, "c")
            .unwrap()
            .into_iter()
            .collect()
    }

    fn qualify(clause: &str) -> String {
        Condition::parse(clause).unwrap().qualify("c").unwrap()
    }

    // ==================== Column Extraction ====================

    #[test]
    fn test_single_column() {
        assert_eq!(columns("AGE > 30"), vec!["AGE"]);
    }

    #[test]
    fn test_columns_in_appearance_order_without_duplicates() {
        assert_eq!(
            columns("AGE > 1 AND NAME = 'x' AND AGE < 90"),
            vec!["AGE", "NAME"]
        );
    }

    #[test]
    fn test_columns_are_uppercased() {
        assert_eq!(columns("age > 30 AND Name = 'x'"), vec!["AGE", "NAME"]);
    }

    #[test]
    fn test_literals_only_yield_no_columns() {
        assert!(columns("1 = 1").is_empty());
        assert!(columns("'a' <> 'b'").is_empty());
    }

    #[test]
    fn test_string_literals_are_not_columns() {
        assert_eq!(columns("NAME = 'AGE'"), vec!["NAME"]);
        assert_eq!(columns("NAME = \"Bob\""), vec!["NAME"]);
    }

    #[test]
    fn test_columns_inside_functions_and_lists() {
        assert_eq!(
            columns("UPPER(NAME) = 'BOB' OR CITY IN ('Oslo', 'Rome') OR AGE BETWEEN 1 AND 5"),
            vec!["NAME", "CITY", "AGE"]
        );
    }

    #[test]
    fn test_qualified_and_nested_paths() {
        assert_eq!(columns("c.AGE > 30"), vec!["AGE"]);
        assert_eq!(columns("ADDRESS.CITY = 'Oslo'"), vec!["ADDRESS"]);
    }

    #[test]
    fn test_unparseable_condition() {
        let err = extract_condition_columns("AGE >", "c").unwrap_err();
        assert_eq!(err.code(), 9004);
    }

    #[test]
    fn test_trailing_clauses_rejected() {
        let err = Condition::parse("AGE > 1 ORDER BY NAME").unwrap_err();
        assert!(err.to_string().contains("unexpected clauses"));
        assert!(Condition::parse("AGE > 1 LIMIT 5").is_err());
    }

    #[test]
    fn test_second_statement_rejected() {
        let err = Condition::parse("AGE > 1; DROP TABLE people").unwrap_err();
        assert_eq!(err.code(), 9004);
    }

    // ==================== Qualification ====================

    #[test]
    fn test_qualify_simple_comparison() {
        assert_eq!(qualify("AGE > 30"), "c.AGE > 30");
    }

    #[test]
    fn test_qualify_conjunction_keeps_literals() {
        assert_eq!(
            qualify("NAME = 'AGE' AND AGE >= 21"),
            "c.NAME = 'AGE' AND c.AGE >= 21"
        );
    }

    #[test]
    fn test_qualify_column_adjacent_to_punctuation() {
        assert_eq!(qualify("NAME='X'"), "c.NAME = 'X'");
        assert_eq!(qualify("AGE>30"), "c.AGE > 30");
    }

    #[test]
    fn test_qualify_collapses_whitespace() {
        assert_eq!(qualify("AGE   >    30"), "c.AGE > 30");
    }

    #[test]
    fn test_qualify_never_double_prefixes() {
        assert_eq!(qualify("c.AGE > 30"), "c.AGE > 30");
        assert_eq!(qualify("c.age > 30"), "c.AGE > 30");
    }

    #[test]
    fn test_qualify_nested_path() {
        assert_eq!(qualify("ADDRESS.CITY = 'Oslo'"), "c.ADDRESS.CITY = 'Oslo'");
    }

    #[test]
    fn test_qualify_lowercase_column() {
        assert_eq!(qualify("age > 30"), "c.AGE > 30");
    }

    #[test]
    fn test_qualify_parentheses_and_functions() {
        assert_eq!(
            qualify("(AGE > 1 OR AGE < 0) AND NAME IS NOT NULL"),
            "(c.AGE > 1 OR c.AGE < 0) AND c.NAME IS NOT NULL"
        );
        assert_eq!(qualify("UPPER(NAME) = 'BOB'"), "UPPER(c.NAME) = 'BOB'");
    }

    #[test]
    fn test_qualify_double_quoted_string_becomes_literal() {
        assert_eq!(qualify("NAME = \"Bob\""), "c.NAME = 'Bob'");
        assert_eq!(qualify("NAME = \"O'Neil\""), "c.NAME = 'O''Neil'");
    }

    #[test]
    fn test_qualify_with_custom_alias() {
        let condition = Condition::parse("AGE > 30").unwrap();
        assert_eq!(condition.qualify("root").unwrap(), "root.AGE > 30");
    }

    #[test]
    fn test_qualify_rejects_subquery() {
        let condition = Condition::parse("AGE IN (SELECT AGE FROM other)").unwrap();
        let err = condition.qualify("c").unwrap_err();
        assert_eq!(err.code(), 9006);
    }
}
