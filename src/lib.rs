//! # Elastic Query
//!
//! A fluent, relational-style query builder for Elasticsearch-style search
//! backends.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Builder                            │
//! │  • select / where / order_by / for_page                    │
//! │  • Operator tokens resolved to clause kind + bool group    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Grammar                            │
//! │  • Pure QuerySpec → QueryDocument                          │
//! │  • _source, query.bool, sort, from, size                   │
//! │  • Registered extensions for custom clause kinds           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                    (SearchTransport: search / count)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Processor                           │
//! │  • hits.hits → rows (source + id)                          │
//! │  • count → u64                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use elastic_query::{Connection, QueryConfig};
//! use elastic_query::query::SortDirection;
//! use elastic_query::transport::RecordingTransport;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let transport = Arc::new(RecordingTransport::new());
//!     transport.push_hits(vec![("1".to_string(), json!({"name": "Alice", "age": 31}))]);
//!
//!     let conn = Connection::new(transport, QueryConfig::default());
//!     let rows = conn
//!         .index("users", Vec::<String>::new())
//!         .where_eq("status", "active")
//!         .where_op("age", ">=", 18)
//!         .order_by("age", SortDirection::Desc, None)
//!         .take(10)
//!         .get()
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(rows[0]["name"], json!("Alice"));
//!     assert_eq!(rows[0]["_id"], json!("1"));
//! }
//! ```
//!
//! ## Modules
//!
//! - [`query`]: Builder, Grammar, Processor and the clause model
//! - [`transport`]: The [`transport::SearchTransport`] capability and an in-memory double
//! - [`connection`]: [`Connection`], the entry point handing out builders
//! - [`config`]: [`QueryConfig`]
//! - [`error`]: [`QueryError`] and its parts
//! - [`metrics`]: Request counters and latency histograms

pub mod config;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod query;
pub mod transport;

pub use config::QueryConfig;
pub use connection::Connection;
pub use error::{CompileError, ParseSortDirectionError, QueryError, ResponseError, TransportError};
pub use query::{Builder, Grammar, Processor, QueryDocument, QuerySpec, Row, WhereClause};
pub use transport::{RecordingTransport, SearchTransport};
pub use crate::metrics::LatencyTimer;
