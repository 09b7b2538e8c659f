//! FilterService - the request pipeline
//!
//! Validation, query translation, store access, projection and packaging for
//! a single request. Every stage short-circuits on failure with its own code;
//! no partial data is ever returned alongside an error.

use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::envelope::ResponseEnvelope;
use crate::error::{FilterError, Result};
use crate::gateway::{ContainerClient, StoreConnector};
use crate::projection::{ProjectedRecord, RawRecord, data_columns, project_records};
use crate::request::{ValidatedRequest, require_container, validate_request};
use crate::sql::query::{DocumentQuery, build_filter_query};

/// Translates filter requests into store queries and packages the results
pub struct FilterService<C> {
    connector: C,
    config: StoreConfig,
}

impl<C: StoreConnector> FilterService<C> {
    pub fn new(connector: C, config: StoreConfig) -> Self {
        Self { connector, config }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Handle a raw request and return the rendered envelope.
    pub async fn handle(&self, container: Option<&str>, body: &[u8]) -> String {
        self.filter(container, body).await.into_json()
    }

    /// Run the full pipeline for a raw request.
    pub async fn filter(&self, container: Option<&str>, body: &[u8]) -> ResponseEnvelope {
        match self.run(container, body).await {
            Ok(records) => {
                info!(
                    container = container.unwrap_or_default(),
                    rows = records.len(),
                    "Filter request completed"
                );
                ResponseEnvelope::success(records)
            }
            Err(err) => {
                warn!(
                    container = container.unwrap_or_default(),
                    code = err.code(),
                    error = %err,
                    "Filter request failed"
                );
                ResponseEnvelope::failure(&err)
            }
        }
    }

    async fn run(&self, container: Option<&str>, body: &[u8]) -> Result<Vec<ProjectedRecord>> {
        let ValidatedRequest { container, request } = validate_request(container, body)?;
        let query = build_filter_query(&request, &self.config.record_alias)?;

        let records = self.execute(&container, &query).await?;

        let projected = project_records(&records, request.output_columns())?;
        if projected.len() >= self.config.result_limit {
            return Err(FilterError::ResultLimit(self.config.result_limit));
        }

        Ok(projected)
    }

    /// Sample one record of `container` and list its data columns.
    pub async fn describe_columns(&self, container: Option<&str>) -> ResponseEnvelope<String> {
        let result = async {
            let container = require_container(container)?;
            let sample = self
                .execute(&container, &DocumentQuery::sample(&self.config.record_alias))
                .await?;
            Ok::<_, FilterError>(sample.first().map(data_columns).unwrap_or_default())
        }
        .await;

        match result {
            Ok(columns) => ResponseEnvelope::success(columns),
            Err(err) => {
                warn!(code = err.code(), error = %err, "Column discovery failed");
                ResponseEnvelope::failure(&err)
            }
        }
    }

    async fn execute(&self, container: &str, query: &DocumentQuery) -> Result<Vec<RawRecord>> {
        let client = self
            .connector
            .connect(container)
            .await
            .map_err(|e| FilterError::StoreClient(e.to_string()))?;

        client
            .query(query)
            .await
            .map_err(|e| FilterError::QueryExecution(e.to_string()))
    }
}
