// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Compiled query document
//!
//! Typed mirror of the backend request:
//!
//! ```text
//! { index, type?, body: { _source?, query?: { bool: {...} }, sort?, from?, size? } }
//! ```
//!
//! Empty sections are skipped on serialization, so a document only carries
//! what the query actually set. Field order is fixed by the struct layout.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A fully compiled search or count request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDocument {
    pub index: Vec<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub doc_type: Vec<String>,
    #[serde(default)]
    pub body: SearchBody,
}

impl QueryDocument {
    pub fn new(index: Vec<String>, doc_type: Vec<String>) -> Self {
        Self { index, doc_type, body: SearchBody::default() }
    }

    /// JSON value of the whole document
    pub fn to_value(&self) -> Value {
        // A struct of strings, vectors and JSON values always serializes.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Compact JSON string, stable for identical documents
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

/// Request body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchBody {
    #[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryClause>,
    /// `field -> {order, mode?}`, insertion-ordered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// `_source` filtering section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
}

/// `query` section; only the `bool` compound query is produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryClause {
    pub bool: BoolQuery,
}

/// `bool` query groups, each an ordered list of compiled clauses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoolQuery {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Value>,
}

impl BoolQuery {
    pub fn is_empty(&self) -> bool {
        self.filter.is_empty()
            && self.must.is_empty()
            && self.must_not.is_empty()
            && self.should.is_empty()
    }

    pub(crate) fn group_mut(&mut self, group: super::BoolGroup) -> &mut Vec<Value> {
        use super::BoolGroup;
        match group {
            BoolGroup::Filter => &mut self.filter,
            BoolGroup::Must => &mut self.must,
            BoolGroup::MustNot => &mut self.must_not,
            BoolGroup::Should => &mut self.should,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document_skips_sections() {
        let doc = QueryDocument::new(vec!["users".into()], Vec::new());
        assert_eq!(doc.to_value(), json!({"index": ["users"], "body": {}}));
    }

    #[test]
    fn test_type_serialized_when_present() {
        let doc = QueryDocument::new(vec!["users".into()], vec!["_doc".into()]);
        assert_eq!(doc.to_value()["type"], json!(["_doc"]));
    }

    #[test]
    fn test_bool_groups_serialize_only_populated() {
        let mut query = BoolQuery::default();
        query.must_not.push(json!({"term": {"deleted": {"value": true}}}));
        let value = serde_json::to_value(QueryClause { bool: query }).unwrap();
        assert_eq!(
            value,
            json!({"bool": {"must_not": [{"term": {"deleted": {"value": true}}}]}})
        );
    }

    #[test]
    fn test_document_deserializes_back() {
        let raw = json!({
            "index": ["logs"],
            "body": {"from": 10, "size": 5, "_source": {"includes": ["msg"]}}
        });
        let doc: QueryDocument = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.body.from, Some(10));
        assert_eq!(doc.body.size, Some(5));
        assert_eq!(doc.body.source.unwrap().includes, vec!["msg".to_string()]);
    }
}
