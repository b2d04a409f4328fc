// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Connection - entry point handing out query builders.
//!
//! Owns the transport, the grammar (with any registered clause extensions),
//! the processor and the config. The relational surface an ORM integration
//! expects (raw statements, writes, transactions) is present only so callers
//! get an explicit [`QueryError::Unsupported`] instead of a silent no-op.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::QueryConfig;
use crate::error::{QueryError, TransportError};
use crate::query::builder::unsupported;
use crate::query::{Builder, Grammar, Processor, QueryDocument};
use crate::transport::SearchTransport;

/// A search connection
pub struct Connection {
    transport: Arc<dyn SearchTransport>,
    grammar: Arc<Grammar>,
    processor: Processor,
    config: QueryConfig,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("grammar", &self.grammar)
            .field("config", &self.config)
            .finish()
    }
}

impl Connection {
    pub fn new(transport: Arc<dyn SearchTransport>, config: QueryConfig) -> Self {
        debug!(per_page = config.per_page, id_key = %config.id_key, "Creating search connection");
        Self {
            transport,
            grammar: Arc::new(Grammar::with_boost(config.default_boost)),
            processor: Processor::new(config.id_key.clone()),
            config,
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Grammar for registering clause extensions.
    ///
    /// Builders already handed out keep the grammar they were created with;
    /// register extensions before calling [`Connection::query`].
    pub fn grammar_mut(&mut self) -> &mut Grammar {
        Arc::make_mut(&mut self.grammar)
    }

    /// A blank builder on this connection
    pub fn query(&self) -> Builder {
        Builder::with_parts(
            Arc::clone(&self.transport),
            Arc::clone(&self.grammar),
            self.processor.clone(),
            self.config.per_page,
        )
    }

    /// A builder targeting `index` (and optional mapping types)
    pub fn index<T, U>(&self, index: impl Into<String>, types: T) -> Builder
    where
        T: IntoIterator<Item = U>,
        U: Into<String>,
    {
        self.query().from_types([index.into()], types)
    }

    /// Alias of [`Connection::index`]
    pub fn table<T, U>(&self, index: impl Into<String>, types: T) -> Builder
    where
        T: IntoIterator<Item = U>,
        U: Into<String>,
    {
        self.index(index, types)
    }

    /// Send a compiled search document as-is
    pub async fn search(&self, document: &QueryDocument) -> Result<Value, TransportError> {
        self.transport.search(document).await
    }

    /// Send a compiled count document as-is
    pub async fn count(&self, document: &QueryDocument) -> Result<Value, TransportError> {
        self.transport.count(document).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Unsupported relational surface
    // ═══════════════════════════════════════════════════════════════════════

    pub fn raw(&self, _expression: &str) -> Result<Value, QueryError> {
        Err(unsupported("raw"))
    }

    pub fn select_one(
        &self,
        _statement: &str,
        _bindings: &[Value],
    ) -> Result<Option<Value>, QueryError> {
        Err(unsupported("select_one"))
    }

    pub fn select(&self, _statement: &str, _bindings: &[Value]) -> Result<Vec<Value>, QueryError> {
        Err(unsupported("select"))
    }

    pub fn insert(&self, _statement: &str, _bindings: &[Value]) -> Result<bool, QueryError> {
        Err(unsupported("insert"))
    }

    pub fn update(&self, _statement: &str, _bindings: &[Value]) -> Result<u64, QueryError> {
        Err(unsupported("update"))
    }

    pub fn delete(&self, _statement: &str, _bindings: &[Value]) -> Result<u64, QueryError> {
        Err(unsupported("delete"))
    }

    pub fn statement(&self, _statement: &str, _bindings: &[Value]) -> Result<bool, QueryError> {
        Err(unsupported("statement"))
    }

    pub fn affecting_statement(
        &self,
        _statement: &str,
        _bindings: &[Value],
    ) -> Result<u64, QueryError> {
        Err(unsupported("affecting_statement"))
    }

    pub fn unprepared(&self, _statement: &str) -> Result<bool, QueryError> {
        Err(unsupported("unprepared"))
    }

    /// Never invokes `callback`
    pub fn transaction<F, T>(&self, _callback: F) -> Result<T, QueryError>
    where
        F: FnOnce(&Self) -> T,
    {
        Err(unsupported("transaction"))
    }

    pub fn begin_transaction(&self) -> Result<(), QueryError> {
        Err(unsupported("begin_transaction"))
    }

    pub fn commit(&self) -> Result<(), QueryError> {
        Err(unsupported("commit"))
    }

    pub fn roll_back(&self) -> Result<(), QueryError> {
        Err(unsupported("roll_back"))
    }

    pub fn transaction_level(&self) -> Result<u32, QueryError> {
        Err(unsupported("transaction_level"))
    }

    /// Never invokes `callback`
    pub fn pretend<F>(&self, _callback: F) -> Result<Vec<QueryDocument>, QueryError>
    where
        F: FnOnce(&Self),
    {
        Err(unsupported("pretend"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ClauseKind, WhereClause};
    use crate::transport::RecordingTransport;
    use serde_json::json;
    use std::cell::Cell;

    fn connection() -> (Arc<RecordingTransport>, Connection) {
        let transport = Arc::new(RecordingTransport::new());
        (transport.clone(), Connection::new(transport, QueryConfig::default()))
    }

    #[test]
    fn test_index_and_table_target() {
        let (_, conn) = connection();
        let doc = conn.index("users", ["_doc"]).to_dsl().unwrap();
        assert_eq!(doc.index, vec!["users"]);
        assert_eq!(doc.doc_type, vec!["_doc"]);

        let doc = conn.table("logs", Vec::<String>::new()).to_dsl().unwrap();
        assert_eq!(doc.index, vec!["logs"]);
        assert!(doc.doc_type.is_empty());
    }

    #[test]
    fn test_config_flows_into_builders() {
        let transport = Arc::new(RecordingTransport::new());
        let config = QueryConfig { per_page: 50, id_key: "id".into(), default_boost: 2.0 };
        let conn = Connection::new(transport, config);

        let builder = conn.query().from(["users"]).where_eq("a", 1).for_page(2, None);
        assert_eq!(builder.spec().offset, Some(50));
        assert_eq!(builder.processor().id_key(), "id");
        let doc = builder.to_dsl().unwrap();
        assert_eq!(doc.body.query.unwrap().bool.filter[0]["term"]["a"]["boost"], json!(2.0));
    }

    #[test]
    fn test_registered_extension_reaches_builders() {
        let (_, mut conn) = connection();
        conn.grammar_mut().register("exists", |clause: &WhereClause| {
            json!({"exists": {"field": clause.field.clone()}})
        });
        let doc = conn
            .index("users", Vec::<String>::new())
            .where_op("email", "exists", Value::Null)
            .to_dsl()
            .unwrap();
        assert_eq!(doc.body.query.unwrap().bool.filter[0], json!({"exists": {"field": "email"}}));
        assert!(conn.grammar().has_extension("exists"));
        assert!(!ClauseKind::from_token("exists").is_builtin());
    }

    #[test]
    fn test_unsupported_surface_has_no_side_effects() {
        let (transport, conn) = connection();
        let results = [
            conn.raw("1").map(|_| ()),
            conn.select_one("q", &[]).map(|_| ()),
            conn.select("q", &[]).map(|_| ()),
            conn.insert("q", &[]).map(|_| ()),
            conn.update("q", &[]).map(|_| ()),
            conn.delete("q", &[]).map(|_| ()),
            conn.statement("q", &[]).map(|_| ()),
            conn.affecting_statement("q", &[]).map(|_| ()),
            conn.unprepared("q").map(|_| ()),
            conn.begin_transaction(),
            conn.commit(),
            conn.roll_back(),
            conn.transaction_level().map(|_| ()),
        ];
        for result in results {
            assert!(result.unwrap_err().is_unsupported());
        }

        let called = Cell::new(false);
        assert!(conn.transaction(|_| called.set(true)).unwrap_err().is_unsupported());
        assert!(conn.pretend(|_| called.set(true)).unwrap_err().is_unsupported());
        assert!(!called.get());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_pass_through_requests() {
        let (transport, conn) = connection();
        transport.push_count(Ok(json!({"count": 4})));
        let doc = conn.index("users", Vec::<String>::new()).to_dsl().unwrap();
        assert_eq!(conn.count(&doc).await.unwrap(), json!({"count": 4}));
        assert_eq!(conn.search(&doc).await.unwrap(), json!({"hits": {"hits": []}}));
        assert_eq!(transport.request_count(), 2);
    }
}
