// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Builder - fluent, relational-style query accumulation
//!
//! Each call refines the builder's [`QuerySpec`] and hands the builder back,
//! so queries read as one chain. Execution methods borrow the builder and
//! compile a clone of the query state; the builder's own state is never changed by
//! running it.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use elastic_query::query::{Builder, SortDirection};
//! use elastic_query::transport::RecordingTransport;
//!
//! let builder = Builder::new(Arc::new(RecordingTransport::new()))
//!     .from(["users"])
//!     .select(["name", "age"])
//!     .where_eq("status", "active")
//!     .where_op("age", ">=", 18)
//!     .where_not_in("role", ["bot", "system"])
//!     .order_by("age", SortDirection::Desc, None)
//!     .for_page(2, Some(20));
//!
//! let document = builder.to_dsl().unwrap();
//! assert_eq!(document.body.from, Some(20));
//! assert_eq!(document.body.size, Some(20));
//! ```

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::clause::{BoolGroup, Params, QuerySpec, SortDirection, WhereClause};
use super::document::QueryDocument;
use super::grammar::Grammar;
use super::operator::Operator;
use super::processor::{Processor, Row};
use crate::config::QueryConfig;
use crate::error::{CompileError, QueryError};
use crate::metrics::{self, LatencyTimer};
use crate::transport::SearchTransport;

/// Backend field holding the document id
pub const ID_FIELD: &str = "_id";

/// Fluent query builder bound to a transport
#[derive(Clone)]
pub struct Builder {
    transport: Arc<dyn SearchTransport>,
    grammar: Arc<Grammar>,
    processor: Processor,
    per_page: u64,
    spec: QuerySpec,
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("grammar", &self.grammar)
            .field("processor", &self.processor)
            .field("per_page", &self.per_page)
            .field("spec", &self.spec)
            .finish()
    }
}

impl Builder {
    /// Builder with the default grammar, processor and page size
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        let config = QueryConfig::default();
        Self::with_parts(
            transport,
            Arc::new(Grammar::with_boost(config.default_boost)),
            Processor::new(config.id_key),
            config.per_page,
        )
    }

    /// Builder from explicit collaborators
    pub fn with_parts(
        transport: Arc<dyn SearchTransport>,
        grammar: Arc<Grammar>,
        processor: Processor,
        per_page: u64,
    ) -> Self {
        Self {
            transport,
            grammar,
            processor,
            per_page,
            spec: QuerySpec::new(),
        }
    }

    /// Fresh builder sharing this one's transport, grammar and processor
    pub fn new_query(&self) -> Self {
        Self::with_parts(
            Arc::clone(&self.transport),
            Arc::clone(&self.grammar),
            self.processor.clone(),
            self.per_page,
        )
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    pub fn into_spec(self) -> QuerySpec {
        self.spec
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Projection and targets
    // ═══════════════════════════════════════════════════════════════════════

    /// Set the fields returned per hit; `*` selects everything
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.projection.set_includes(collect_strings(fields));
        self
    }

    /// Add fields to the current selection
    pub fn add_select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.projection.add_includes(collect_strings(fields));
        self
    }

    /// Set the fields left out of each hit's source
    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.projection.excludes = collect_strings(fields);
        self
    }

    /// Set the indices the query runs against
    pub fn from<I, S>(self, indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.from_types(indices, Vec::<String>::new())
    }

    /// Set the indices and mapping types the query runs against
    pub fn from_types<I, S, T, U>(mut self, indices: I, types: T) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        T: IntoIterator<Item = U>,
        U: Into<String>,
    {
        self.spec.target.indices = collect_strings(indices);
        self.spec.target.types = collect_strings(types);
        self
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Filters
    // ═══════════════════════════════════════════════════════════════════════

    /// Equality filter: `term` in the `filter` group
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add_clause(WhereClause::term(field, value))
    }

    /// Filter with a comparison operator (`=`, `!=`, `<>`, `>=`, `>`, `<=`, `<`)
    /// or a clause kind token (`terms`, `query_string`, a registered custom kind, ...)
    pub fn where_op(
        self,
        field: impl Into<String>,
        operator: &str,
        value: impl Into<Value>,
    ) -> Self {
        self.where_with(field, operator, value, None, Params::new())
    }

    /// Full form of [`Builder::where_op`]; an explicit `group` replaces the
    /// operator's default group.
    pub fn where_with(
        self,
        field: impl Into<String>,
        operator: &str,
        value: impl Into<Value>,
        group: Option<BoolGroup>,
        params: Params,
    ) -> Self {
        let (kind, default_group, value) = Operator::parse(operator).resolve(value.into());
        let clause = WhereClause::new(field, kind, value)
            .in_group(group.unwrap_or(default_group))
            .with_params(params);
        self.add_clause(clause)
    }

    /// Pass a clause document through to the given group untouched
    pub fn where_raw(self, document: Value, group: BoolGroup) -> Self {
        self.add_clause(WhereClause::raw(document, group))
    }

    pub fn where_in<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.where_in_with(field, values, Params::new())
    }

    pub fn where_in_with<I, V>(self, field: impl Into<String>, values: I, params: Params) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.add_clause(WhereClause::terms(field, values).with_params(params))
    }

    pub fn where_not_in<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.where_not_in_with(field, values, Params::new())
    }

    pub fn where_not_in_with<I, V>(
        self,
        field: impl Into<String>,
        values: I,
        params: Params,
    ) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let clause = WhereClause::terms(field, values).in_group(BoolGroup::MustNot);
        self.add_clause(clause.with_params(params))
    }

    /// Inclusive range filter `from <= field <= to`
    pub fn where_between(
        self,
        field: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        self.between(field, from, to, false, Params::new())
    }

    /// [`Builder::where_between`] with extra range params (`format`, `time_zone`, ...)
    pub fn where_between_with(
        self,
        field: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
        params: Params,
    ) -> Self {
        self.between(field, from, to, false, params)
    }

    pub fn where_not_between(
        self,
        field: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        self.between(field, from, to, true, Params::new())
    }

    pub fn where_not_between_with(
        self,
        field: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
        params: Params,
    ) -> Self {
        self.between(field, from, to, true, params)
    }

    fn between(
        self,
        field: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
        not: bool,
        params: Params,
    ) -> Self {
        let clause = WhereClause::between(field, from, to).in_group(BoolGroup::negated_if(not));
        self.add_clause(clause.with_params(params))
    }

    /// Scored full-text match using query string syntax
    pub fn where_query_string(self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.where_query_string_with(field, text, Params::new())
    }

    /// [`Builder::where_query_string`] with extra params (`default_operator`, `analyzer`, ...)
    pub fn where_query_string_with(
        self,
        field: impl Into<String>,
        text: impl Into<String>,
        params: Params,
    ) -> Self {
        self.add_clause(WhereClause::query_string(field, text).with_params(params))
    }

    pub fn where_regex(self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.where_regex_with(field, pattern, Params::new())
    }

    pub fn where_regex_with(
        self,
        field: impl Into<String>,
        pattern: impl Into<String>,
        params: Params,
    ) -> Self {
        self.add_clause(WhereClause::regex(field, pattern).with_params(params))
    }

    /// Append a pre-built clause (for params or groups the shorthands don't cover)
    pub fn add_clause(mut self, clause: WhereClause) -> Self {
        self.spec.filters.push(clause);
        self
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Sorting and pagination
    // ═══════════════════════════════════════════════════════════════════════

    /// Sort by a field. Re-sorting by the same field updates it in place.
    pub fn order_by(mut self, field: &str, direction: SortDirection, mode: Option<&str>) -> Self {
        self.spec.set_sort(field, direction, mode.map(str::to_string));
        self
    }

    pub fn order_by_desc(self, field: &str, mode: Option<&str>) -> Self {
        self.order_by(field, SortDirection::Desc, mode)
    }

    /// Alias of [`Builder::offset`]
    pub fn skip(self, value: i64) -> Self {
        self.offset(value)
    }

    /// Number of hits to skip; negative values become 0
    pub fn offset(mut self, value: i64) -> Self {
        self.spec.offset = Some(value.max(0) as u64);
        self
    }

    /// Alias of [`Builder::limit`]
    pub fn take(self, value: i64) -> Self {
        self.limit(value)
    }

    /// Maximum number of hits; negative values are ignored
    pub fn limit(mut self, value: i64) -> Self {
        if value >= 0 {
            self.spec.limit = Some(value as u64);
        }
        self
    }

    /// Offset and limit for a 1-based page; `per_page` defaults to the configured size
    pub fn for_page(self, page: i64, per_page: Option<i64>) -> Self {
        let per_page = per_page.unwrap_or(self.per_page as i64);
        self.skip(page.saturating_sub(1).saturating_mul(per_page)).take(per_page)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Compilation and execution
    // ═══════════════════════════════════════════════════════════════════════

    /// Compile the current query without running it
    pub fn to_dsl(&self) -> Result<QueryDocument, CompileError> {
        self.grammar.compile(&self.spec)
    }

    /// Run the query and return its rows
    pub async fn get(&self) -> Result<Vec<Row>, QueryError> {
        self.run_search(&self.spec).await
    }

    /// Run the query returning only `columns`, for this call only
    pub async fn get_columns<I, S>(&self, columns: I) -> Result<Vec<Row>, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = self.spec_with_columns(columns);
        self.run_search(&spec).await
    }

    /// First row, if any
    pub async fn first(&self) -> Result<Option<Row>, QueryError> {
        let mut spec = self.spec.clone();
        spec.limit = Some(1);
        Ok(self.run_search(&spec).await?.into_iter().next())
    }

    /// First row with only `columns`, if any
    pub async fn first_columns<I, S>(&self, columns: I) -> Result<Option<Row>, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = self.spec_with_columns(columns);
        spec.limit = Some(1);
        Ok(self.run_search(&spec).await?.into_iter().next())
    }

    /// Look a document up by id
    pub async fn find(&self, id: impl Into<Value>) -> Result<Option<Row>, QueryError> {
        let mut spec = self.spec.clone();
        spec.filters.push(WhereClause::term(ID_FIELD, id));
        spec.limit = Some(1);
        Ok(self.run_search(&spec).await?.into_iter().next())
    }

    /// A single column of the first row
    pub async fn value(&self, column: &str) -> Result<Option<Value>, QueryError> {
        let row = self.first_columns([column]).await?;
        Ok(row.and_then(|mut row| row.remove(column)))
    }

    /// One column's values across all rows; missing values become `null`
    pub async fn pluck(&self, column: &str) -> Result<Vec<Value>, QueryError> {
        let rows = self.get_columns([column]).await?;
        Ok(rows
            .into_iter()
            .map(|mut row| row.remove(column).unwrap_or(Value::Null))
            .collect())
    }

    /// One column's values keyed by another column's value.
    ///
    /// Later rows win on duplicate keys. The id key is always present on a
    /// row, so it can be used as `key` without selecting it.
    pub async fn pluck_keyed(
        &self,
        column: &str,
        key: &str,
    ) -> Result<Map<String, Value>, QueryError> {
        let rows = self.get_columns([column, key]).await?;
        let mut plucked = Map::new();
        for mut row in rows {
            let key = row.get(key).map(key_string).unwrap_or_default();
            plucked.insert(key, row.remove(column).unwrap_or(Value::Null));
        }
        Ok(plucked)
    }

    /// Plucked values joined with `glue`
    pub async fn implode(&self, column: &str, glue: &str) -> Result<String, QueryError> {
        let values = self.pluck(column).await?;
        Ok(values.iter().map(key_string).collect::<Vec<_>>().join(glue))
    }

    /// Number of matching documents, ignoring pagination, sort and projection
    pub async fn count(&self) -> Result<u64, QueryError> {
        let result = self.execute_count().await;
        metrics::record_result("count", &result);
        result
    }

    async fn execute_count(&self) -> Result<u64, QueryError> {
        let document = self.grammar.compile_count(&self.spec)?;
        debug!(index = ?document.index, "Executing count");

        let response = {
            let _timer = LatencyTimer::new("count");
            self.transport.count(&document).await
        };
        let response = response.map_err(|e| {
            warn!(error = %e, "Count request failed");
            e
        })?;

        Ok(self.processor.process_count(&response)?)
    }

    async fn run_search(&self, spec: &QuerySpec) -> Result<Vec<Row>, QueryError> {
        let result = self.execute_search(spec).await;
        metrics::record_result("search", &result);
        result
    }

    async fn execute_search(&self, spec: &QuerySpec) -> Result<Vec<Row>, QueryError> {
        let document = self.grammar.compile(spec)?;
        debug!(index = ?document.index, "Executing search");

        let response = {
            let _timer = LatencyTimer::new("search");
            self.transport.search(&document).await
        };
        let response = response.map_err(|e| {
            warn!(error = %e, "Search request failed");
            e
        })?;

        let rows = self.processor.process_select(&response)?;
        metrics::record_rows(rows.len());
        debug!(rows = rows.len(), "Search complete");
        Ok(rows)
    }

    fn spec_with_columns<I, S>(&self, columns: I) -> QuerySpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = self.spec.clone();
        spec.projection.set_includes(collect_strings(columns));
        spec
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Unsupported surface
    // ═══════════════════════════════════════════════════════════════════════

    pub fn insert(&self, _values: &Value) -> Result<u64, QueryError> {
        Err(unsupported("insert"))
    }

    pub fn update(&self, _values: &Value) -> Result<u64, QueryError> {
        Err(unsupported("update"))
    }

    pub fn delete(&self) -> Result<u64, QueryError> {
        Err(unsupported("delete"))
    }

    pub fn truncate(&self) -> Result<(), QueryError> {
        Err(unsupported("truncate"))
    }
}

pub(crate) fn unsupported(operation: &'static str) -> QueryError {
    metrics::record_unsupported(operation);
    QueryError::unsupported(operation)
}

fn collect_strings<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

/// String form of a value used as a map key or joined text
fn key_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
