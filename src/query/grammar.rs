// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Grammar - compiles a [`QuerySpec`] into a [`QueryDocument`]
//!
//! Compilation is pure and deterministic; the same QuerySpec always yields the same
//! document, key order included. Sections are filled in a fixed order:
//!
//! ```text
//! skeleton {index, type}
//!   → _source   (projection)
//!   → query.bool.<group>[]   (filters, original order within a group)
//!   → sort      (insertion order)
//!   → from      (offset)
//!   → size      (limit)
//! ```
//!
//! Clause kinds without a built-in rule compile only through an extension
//! registered with [`Grammar::register`].

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::clause::{ClauseKind, Params, QuerySpec, WhereClause};
use super::document::{BoolQuery, QueryClause, QueryDocument, SourceFilter};
use crate::error::CompileError;

/// Compiler rule for a custom clause kind
pub trait ClauseCompiler: Send + Sync {
    fn compile(&self, clause: &WhereClause) -> Value;
}

impl<F> ClauseCompiler for F
where
    F: Fn(&WhereClause) -> Value + Send + Sync,
{
    fn compile(&self, clause: &WhereClause) -> Value {
        self(clause)
    }
}

/// Query compiler
#[derive(Clone)]
pub struct Grammar {
    default_boost: f64,
    extensions: HashMap<String, Arc<dyn ClauseCompiler>>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.extensions.keys().collect();
        names.sort();
        f.debug_struct("Grammar")
            .field("default_boost", &self.default_boost)
            .field("extensions", &names)
            .finish()
    }
}

impl Grammar {
    pub const DEFAULT_BOOST: f64 = 1.0;

    pub fn new() -> Self {
        Self::with_boost(Self::DEFAULT_BOOST)
    }

    /// Grammar emitting `boost` on term and range clauses
    pub fn with_boost(default_boost: f64) -> Self {
        Self { default_boost, extensions: HashMap::new() }
    }

    /// Register a compiler rule for a custom clause kind.
    ///
    /// Built-in kind names can't be overridden through this; their rules
    /// always win since the builder resolves those tokens to built-in kinds.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        compiler: impl ClauseCompiler + 'static,
    ) -> &mut Self {
        let kind = kind.into();
        info!(kind = %kind, "Registered custom clause compiler");
        self.extensions.insert(kind, Arc::new(compiler));
        self
    }

    pub fn has_extension(&self, kind: &str) -> bool {
        self.extensions.contains_key(kind)
    }

    /// Compile a search request
    pub fn compile(&self, spec: &QuerySpec) -> Result<QueryDocument, CompileError> {
        let mut document =
            QueryDocument::new(spec.target.indices.clone(), spec.target.types.clone());

        document.body.source = Self::compile_source(spec);
        document.body.query = self.compile_wheres(&spec.filters)?;
        document.body.sort = Self::compile_orders(spec);
        document.body.from = spec.offset;
        document.body.size = spec.limit;

        debug!(
            index = ?document.index,
            clauses = spec.filters.len(),
            sorts = spec.sorts.len(),
            from = ?document.body.from,
            size = ?document.body.size,
            "Compiled search document"
        );
        Ok(document)
    }

    /// Compile a count request: same filters, no `_source`, `sort`, `from` or `size`
    pub fn compile_count(&self, spec: &QuerySpec) -> Result<QueryDocument, CompileError> {
        self.compile(&spec.for_count())
    }

    fn compile_source(spec: &QuerySpec) -> Option<SourceFilter> {
        if spec.projection.is_empty() {
            return None;
        }
        Some(SourceFilter {
            includes: spec.projection.includes.clone(),
            excludes: spec.projection.excludes.clone(),
        })
    }

    fn compile_wheres(&self, filters: &[WhereClause]) -> Result<Option<QueryClause>, CompileError> {
        let mut bool_query = BoolQuery::default();
        for clause in filters {
            let compiled = self.compile_clause(clause)?;
            bool_query.group_mut(clause.group).push(compiled);
        }

        if bool_query.is_empty() {
            Ok(None)
        } else {
            Ok(Some(QueryClause { bool: bool_query }))
        }
    }

    /// Compile a single clause into its backend shape
    pub fn compile_clause(&self, clause: &WhereClause) -> Result<Value, CompileError> {
        let field = clause.field.as_str();
        let compiled = match &clause.kind {
            ClauseKind::Term => self.compile_term(field, &clause.value, &clause.params),
            ClauseKind::Terms => Self::compile_terms(field, &clause.value, &clause.params),
            ClauseKind::Range => self.compile_range(field, &clause.value, &clause.params)?,
            ClauseKind::QueryString => {
                Self::compile_query_string(field, &clause.value, &clause.params)
            }
            ClauseKind::Regex => Self::compile_regex(field, &clause.value, &clause.params),
            ClauseKind::Raw => clause.value.clone(),
            ClauseKind::Custom(name) => match self.extensions.get(name) {
                Some(compiler) => compiler.compile(clause),
                None => return Err(CompileError::UnknownClauseKind(name.clone())),
            },
        };
        Ok(compiled)
    }

    fn compile_term(&self, field: &str, value: &Value, params: &Params) -> Value {
        let mut inner = Map::new();
        inner.insert("value".into(), value.clone());
        inner.insert("boost".into(), json!(self.default_boost));
        merge(&mut inner, params);
        wrap("term", field, Value::Object(inner))
    }

    fn compile_terms(field: &str, values: &Value, params: &Params) -> Value {
        let mut inner = Map::new();
        inner.insert(field.to_string(), values.clone());
        merge(&mut inner, params);
        json!({ "terms": inner })
    }

    fn compile_range(
        &self,
        field: &str,
        bounds: &Value,
        params: &Params,
    ) -> Result<Value, CompileError> {
        let Value::Object(bounds) = bounds else {
            return Err(CompileError::InvalidRangeBounds { field: field.to_string() });
        };
        let mut inner = bounds.clone();
        inner.insert("boost".into(), json!(self.default_boost));
        merge(&mut inner, params);
        Ok(wrap("range", field, Value::Object(inner)))
    }

    fn compile_query_string(field: &str, query: &Value, params: &Params) -> Value {
        let mut inner = Map::new();
        inner.insert("default_field".into(), Value::String(field.to_string()));
        inner.insert("query".into(), query.clone());
        merge(&mut inner, params);
        json!({ "query_string": inner })
    }

    fn compile_regex(field: &str, pattern: &Value, params: &Params) -> Value {
        let mut inner = Map::new();
        inner.insert("value".into(), pattern.clone());
        merge(&mut inner, params);
        wrap("regexp", field, Value::Object(inner))
    }

    fn compile_orders(spec: &QuerySpec) -> Option<Map<String, Value>> {
        if spec.sorts.is_empty() {
            return None;
        }
        let mut sort = Map::new();
        for (field, entry) in &spec.sorts {
            let mut inner = Map::new();
            inner.insert("order".into(), Value::String(entry.order.as_str().to_string()));
            if let Some(mode) = &entry.mode {
                inner.insert("mode".into(), Value::String(mode.clone()));
            }
            sort.insert(field.clone(), Value::Object(inner));
        }
        Some(sort)
    }
}

/// `{name: {field: inner}}`
fn wrap(name: &str, field: &str, inner: Value) -> Value {
    let mut by_field = Map::new();
    by_field.insert(field.to_string(), inner);
    let mut outer = Map::new();
    outer.insert(name.to_string(), Value::Object(by_field));
    Value::Object(outer)
}

/// Params override the defaults they share a key with
fn merge(target: &mut Map<String, Value>, params: &Params) {
    for (key, value) in params {
        target.insert(key.clone(), value.clone());
    }
}
