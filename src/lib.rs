//! # docstore-filter
//!
//! Translate generic filter requests into document-store queries.
//!
//! A filter request names the output columns a caller wants and a free-form
//! WHERE-style condition over logical column names. This crate parses the
//! condition, reconciles the columns it references with the requested ones,
//! qualifies every identifier with the store's record alias, runs the query,
//! and projects the raw records back down to exactly the requested columns.
//! Results always travel in a stable JSON envelope.
//!
//! ## Features
//!
//! - **Grammar-aware conditions**: conditions are parsed with a real SQL
//!   grammar; columns are discovered and qualified on the parsed tree
//! - **Stable error taxonomy**: every pipeline stage fails with a fixed numeric
//!   code (9000-9011) carried in the response body
//! - **Pluggable store**: the store is reached through [`StoreConnector`]; a
//!   PostgreSQL implementation is included
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docstore_filter::{FilterService, PgConnector, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = StoreConfig::builder("postgres://localhost/mydb")
//!         .namespace("api_test_db")
//!         .build();
//!     let service = FilterService::new(PgConnector::new(config.clone()), config);
//!
//!     let body = br#"{"columns": ["NAME", "AGE"], "filterCondition": "AGE > 30"}"#;
//!     let json = service.handle(Some("people"), body).await;
//!     println!("{}", json);
//! }
//! ```
//!
//! ## Translation
//!
//! ```rust
//! use docstore_filter::{FilterRequest, build_filter_query};
//!
//! let request = FilterRequest::new(vec!["name".into(), "age".into()], "AGE > 30");
//! let query = build_filter_query(&request, "c").unwrap();
//! assert_eq!(query.to_string(), "SELECT c.NAME,c.AGE FROM c WHERE c.AGE > 30");
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod http;
pub mod projection;
pub mod request;
pub mod service;
pub mod sql;

// Re-export main types for convenience
pub use config::{StoreConfig, StoreConfigBuilder};
pub use envelope::{ResponseEnvelope, StatusBody};
pub use error::{FilterError, Result, StoreError};
pub use gateway::{ContainerClient, PgConnector, PgContainerClient, StoreConnector};
pub use projection::{ProjectedRecord, RawRecord, STORE_METADATA_FIELDS, project_records};
pub use request::{FilterRequest, FilterRequestBody, ValidatedRequest, validate_request};
pub use service::FilterService;
pub use sql::{Condition, DocumentQuery, build_filter_query, extract_condition_columns};
