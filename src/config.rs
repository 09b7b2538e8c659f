//! Configuration for the filter service
//!
//! Provides a builder pattern for configuring the store connection and the
//! query translation constants. The value is constructed once by the host and
//! handed to the service explicitly.

use crate::error::StoreError;
use crate::sql::sanitize::validate_record_alias;

/// Default alias the document store uses for the current record
pub const DEFAULT_RECORD_ALIAS: &str = "c";

/// Default ceiling on the number of rows a single request may return
pub const DEFAULT_RESULT_LIMIT: usize = 1000;

/// Default namespace holding the containers
pub const DEFAULT_NAMESPACE: &str = "public";

/// Configuration for the document store and the filter pipeline
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// PostgreSQL database URL
    pub database_url: String,
    /// Namespace (schema) in which containers live (default: "public")
    pub namespace: String,
    /// Token used to qualify column names inside queries (default: "c")
    pub record_alias: String,
    /// Requests whose result count reaches this value fail (default: 1000)
    pub result_limit: usize,
}

impl StoreConfig {
    /// Create a new configuration builder
    pub fn builder(database_url: impl Into<String>) -> StoreConfigBuilder {
        StoreConfigBuilder::new(database_url)
    }

    /// Read the configuration from `DOCSTORE_*` environment variables.
    ///
    /// `DOCSTORE_DATABASE_URL` is required; `DOCSTORE_NAMESPACE`,
    /// `DOCSTORE_RECORD_ALIAS` and `DOCSTORE_RESULT_LIMIT` fall back to the
    /// builder defaults.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        let database_url = lookup("DOCSTORE_DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| StoreError::Config("DOCSTORE_DATABASE_URL is not set".to_string()))?;

        let mut builder = StoreConfigBuilder::new(database_url);

        if let Some(namespace) = lookup("DOCSTORE_NAMESPACE") {
            builder = builder.namespace(namespace);
        }
        if let Some(alias) = lookup("DOCSTORE_RECORD_ALIAS") {
            validate_record_alias(&alias)
                .map_err(|e| StoreError::Config(format!("DOCSTORE_RECORD_ALIAS: {}", e)))?;
            builder = builder.record_alias(alias);
        }
        if let Some(limit) = lookup("DOCSTORE_RESULT_LIMIT") {
            let limit = limit.parse::<usize>().map_err(|e| {
                StoreError::Config(format!("DOCSTORE_RESULT_LIMIT '{}' is invalid: {}", limit, e))
            })?;
            if limit == 0 {
                return Err(StoreError::Config(
                    "DOCSTORE_RESULT_LIMIT must be greater than 0".to_string(),
                ));
            }
            builder = builder.result_limit(limit);
        }

        Ok(builder.build())
    }
}

/// Builder for StoreConfig
#[derive(Debug)]
pub struct StoreConfigBuilder {
    database_url: String,
    namespace: String,
    record_alias: String,
    result_limit: usize,
}

impl StoreConfigBuilder {
    /// Create a new builder with the database URL
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            record_alias: DEFAULT_RECORD_ALIAS.to_string(),
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }

    /// Set the namespace holding the containers (default: "public")
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the record alias used to qualify columns (default: "c")
    pub fn record_alias(mut self, alias: impl Into<String>) -> Self {
        self.record_alias = alias.into();
        self
    }

    /// Set the result-count ceiling (default: 1000)
    pub fn result_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit;
        self
    }

    /// Build the configuration
    pub fn build(self) -> StoreConfig {
        StoreConfig {
            database_url: self.database_url,
            namespace: self.namespace,
            record_alias: self.record_alias,
            result_limit: self.result_limit,
        }
    }
}
