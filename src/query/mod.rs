// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query pipeline
//!
//! Relational-style queries compiled to Elasticsearch bool queries.
//!
//! # Architecture
//!
//! ```text
//! Builder (accumulates QuerySpec)
//!     ↓
//! Grammar::compile → QueryDocument
//!     ↓
//! SearchTransport::search / count → raw JSON
//!     ↓
//! Processor → rows / count
//! ```
//!
//! # Operators
//!
//! ```text
//! where_eq("status", "active")         {term: {status: {value, boost}}}      filter
//! where_op("status", "!=", "banned")   {term: ...}                           must_not
//! where_op("age", ">=", 18)            {range: {age: {gte: 18, boost}}}      filter
//! where_in("tag", [..])                {terms: {tag: [..]}}                  filter
//! where_between("age", 18, 30)         {range: {age: {gte, lte, boost}}}     filter
//! where_query_string("body", "a OR b") {query_string: {default_field, query}} must
//! where_regex("sku", "AB-[0-9]+")      {regexp: {sku: {value}}}              filter
//! where_raw(doc, group)                doc, verbatim                          group
//! ```

pub mod builder;
mod clause;
mod document;
mod grammar;
mod operator;
mod processor;

pub use builder::{Builder, ID_FIELD};
pub use clause::{
    BoolGroup, ClauseKind, Params, Projection, QuerySpec, SortDirection, SortSpec, Target,
    WhereClause,
};
pub use document::{BoolQuery, QueryClause, QueryDocument, SearchBody, SourceFilter};
pub use grammar::{ClauseCompiler, Grammar};
pub use operator::Operator;
pub use processor::{Processor, Row};
