//! Store gateway
//!
//! The pipeline talks to the document store through two seams:
//! [`StoreConnector`] acquires a client for one container, and
//! [`ContainerClient`] runs one query and returns raw records. A client is
//! acquired per request and dropped with it.
//!
//! [`PgConnector`] implements both against PostgreSQL: each container is a
//! table inside the configured namespace.

use std::future::Future;

use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::projection::RawRecord;
use crate::sql::query::{DocumentQuery, Projection};
use crate::sql::sanitize::{quote_identifier, validate_container_name};

/// Acquires per-request clients for named containers
pub trait StoreConnector: Send + Sync {
    type Client: ContainerClient;

    fn connect(&self, container: &str) -> impl Future<Output = Result<Self::Client, StoreError>> + Send;
}

/// Executes queries against a single container
pub trait ContainerClient: Send + Sync {
    fn query(&self, query: &DocumentQuery) -> impl Future<Output = Result<Vec<RawRecord>, StoreError>> + Send;
}

/// PostgreSQL-backed connector
#[derive(Debug, Clone)]
pub struct PgConnector {
    config: StoreConfig,
}

impl PgConnector {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl StoreConnector for PgConnector {
    type Client = PgContainerClient;

    async fn connect(&self, container: &str) -> Result<PgContainerClient, StoreError> {
        validate_container_name(container).map_err(StoreError::InvalidContainer)?;

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&self.config.database_url)
            .await
            .map_err(|e| StoreError::Connection(format!("Database connection failed: {}", e)))?;

        Ok(PgContainerClient {
            pool,
            source: format!(
                "{}.{}",
                quote_identifier(&self.config.namespace),
                quote_identifier(container)
            ),
        })
    }
}

/// Client bound to one container table
#[derive(Debug)]
pub struct PgContainerClient {
    pool: PgPool,
    source: String,
}

impl PgContainerClient {
    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Render `query` as PostgreSQL.
    ///
    /// Unquoted `c.NAME` folds to the lowercase table column, so each column
    /// is aliased back to its uppercase logical name. The rows are wrapped in
    /// `row_to_json` so every record arrives as a JSON object.
    pub fn render(&self, query: &DocumentQuery) -> String {
        let select_list = match query.projection() {
            Projection::All => "*".to_string(),
            Projection::Columns(columns) => columns
                .iter()
                .map(|column| format!("{} AS {}", column, quote_identifier(column.name())))
                .collect::<Vec<_>>()
                .join(", "),
        };

        let mut sql = format!(
            "SELECT {} FROM {} AS {}",
            select_list,
            self.source,
            query.alias()
        );
        if let Some(condition) = query.condition() {
            sql.push_str(&format!(" WHERE {}", condition));
        }
        if let Some(limit) = query.limit() {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        format!("SELECT row_to_json(r) FROM ({}) r", sql)
    }
}

impl ContainerClient for PgContainerClient {
    async fn query(&self, query: &DocumentQuery) -> Result<Vec<RawRecord>, StoreError> {
        let sql = self.render(query);
        debug!(sql = %sql, "Executing container query");

        let rows = sqlx::query_scalar::<_, Value>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| match row {
                Value::Object(record) => Ok(record),
                other => Err(StoreError::Decode(format!(
                    "expected a JSON object, got {}",
                    other
                ))),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::FilterRequest;
    use crate::sql::columns::QualifiedColumn;
    use crate::sql::query::build_filter_query;

    fn client() -> PgContainerClient {
        PgContainerClient {
            pool: PgPoolOptions::new().connect_lazy("postgres://localhost/test").unwrap(),
            source: "\"public\".\"people\"".to_string(),
        }
    }

    #[tokio::test]
    async fn test_render_filter_query() {
        let query = DocumentQuery::select(
            "c",
            vec![
                QualifiedColumn::new("c", "NAME").unwrap(),
                QualifiedColumn::new("c", "AGE").unwrap(),
            ],
            "c.AGE > 30",
        );

        assert_eq!(
            client().render(&query),
            "SELECT row_to_json(r) FROM (SELECT c.NAME AS \"NAME\", c.AGE AS \"AGE\" FROM \"public\".\"people\" AS c WHERE c.AGE > 30) r"
        );
    }

    #[tokio::test]
    async fn test_render_double_quoted_string_as_literal() {
        let request = FilterRequest::new(vec!["NAME".to_string()], "NAME = \"Bob\"");
        let query = build_filter_query(&request, "c").unwrap();

        assert_eq!(
            client().render(&query),
            "SELECT row_to_json(r) FROM (SELECT c.NAME AS \"NAME\" FROM \"public\".\"people\" AS c WHERE c.NAME = 'Bob') r"
        );
    }

    #[tokio::test]
    async fn test_render_sample_query() {
        assert_eq!(
            client().render(&DocumentQuery::sample("c")),
            "SELECT row_to_json(r) FROM (SELECT * FROM \"public\".\"people\" AS c LIMIT 1) r"
        );
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_container() {
        let connector = PgConnector::new(StoreConfig::builder("postgres://localhost/test").build());

        let err = connector.connect("people\"; DROP").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidContainer(_)));
    }
}
