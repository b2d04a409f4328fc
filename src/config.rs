//! Configuration for the query core.
//!
//! # Example
//!
//! ```
//! use elastic_query::QueryConfig;
//!
//! // Minimal config (uses defaults)
//! let config = QueryConfig::default();
//! assert_eq!(config.per_page, 15);
//! assert_eq!(config.id_key, "_id");
//!
//! // Partial config from JSON; missing fields take their defaults
//! let config: QueryConfig = serde_json::from_str(r#"{"per_page": 50}"#).unwrap();
//! assert_eq!(config.per_page, 50);
//! assert_eq!(config.default_boost, 1.0);
//! ```

use serde::Deserialize;

/// Configuration for builders handed out by a [`crate::Connection`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryConfig {
    /// Page size used by `for_page` when none is given (default: 15)
    #[serde(default = "default_per_page")]
    pub per_page: u64,

    /// Row key that carries the backend document id (default: "_id")
    #[serde(default = "default_id_key")]
    pub id_key: String,

    /// Boost emitted on term and range clauses (default: 1.0)
    #[serde(default = "default_boost")]
    pub default_boost: f64,
}

fn default_per_page() -> u64 { 15 }
fn default_id_key() -> String { "_id".to_string() }
fn default_boost() -> f64 { 1.0 }

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            id_key: default_id_key(),
            default_boost: default_boost(),
        }
    }
}
