// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Processor - flattens backend responses into rows and counts.

use serde_json::{Map, Value};

use crate::error::ResponseError;

/// One result row: source fields plus the document id under the id key
pub type Row = Map<String, Value>;

/// Response normalizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processor {
    id_key: String,
}

impl Default for Processor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ID_KEY)
    }
}

impl Processor {
    pub const DEFAULT_ID_KEY: &'static str = "_id";

    /// Processor writing the hit id under `id_key`
    pub fn new(id_key: impl Into<String>) -> Self {
        Self { id_key: id_key.into() }
    }

    pub fn id_key(&self) -> &str {
        &self.id_key
    }

    /// Turn `{hits: {hits: [{_id, _source}]}}` into rows, in response order.
    ///
    /// A hit without `_source` (source filtering disabled it) yields a row with
    /// just the id. A hit without `_id`, or with a non-object `_source`, is
    /// malformed.
    pub fn process_select(&self, response: &Value) -> Result<Vec<Row>, ResponseError> {
        let hits = response
            .get("hits")
            .and_then(|outer| outer.get("hits"))
            .and_then(Value::as_array)
            .ok_or_else(|| ResponseError::malformed("missing 'hits.hits' array"))?;

        hits.iter()
            .enumerate()
            .map(|(position, hit)| self.process_hit(position, hit))
            .collect()
    }

    fn process_hit(&self, position: usize, hit: &Value) -> Result<Row, ResponseError> {
        let id = hit
            .get("_id")
            .ok_or_else(|| ResponseError::malformed(format!("hit {} has no '_id'", position)))?;

        let mut row = match hit.get("_source") {
            Some(Value::Object(source)) => source.clone(),
            Some(_) => {
                return Err(ResponseError::malformed(format!(
                    "hit {} has a non-object '_source'",
                    position
                )))
            }
            None => Map::new(),
        };
        row.insert(self.id_key.clone(), id.clone());
        Ok(row)
    }

    /// Read the integer `count` out of a count response
    pub fn process_count(&self, response: &Value) -> Result<u64, ResponseError> {
        let count = response
            .get("count")
            .ok_or_else(|| ResponseError::malformed("missing 'count'"))?;

        count
            .as_u64()
            .ok_or_else(|| {
                ResponseError::malformed(format!("'count' is not a non-negative integer: {}", count))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_hit() {
        let processor = Processor::default();
        let rows = processor
            .process_select(&json!({"hits": {"hits": [{"_id": "1", "_source": {"a": 1}}]}}))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(Value::Object(rows[0].clone()), json!({"a": 1, "_id": "1"}));
    }

    #[test]
    fn test_rows_follow_response_order() {
        let processor = Processor::default();
        let response = json!({"hits": {"total": 3, "hits": [
            {"_id": "c", "_score": 3.0, "_source": {"n": 3}},
            {"_id": "a", "_score": 2.0, "_source": {"n": 1}},
            {"_id": "b", "_score": 1.0, "_source": {"n": 2}}
        ]}});
        let ids: Vec<Value> = processor
            .process_select(&response)
            .unwrap()
            .into_iter()
            .map(|row| row["_id"].clone())
            .collect();
        assert_eq!(ids, vec![json!("c"), json!("a"), json!("b")]);
    }

    #[test]
    fn test_custom_id_key_and_id_overrides_source() {
        let processor = Processor::new("id");
        let rows = processor
            .process_select(&json!({"hits": {"hits": [{"_id": "42", "_source": {"id": "stale", "x": true}}]}}))
            .unwrap();
        assert_eq!(rows[0]["id"], json!("42"));
        assert_eq!(rows[0]["x"], json!(true));
    }

    #[test]
    fn test_hit_without_source() {
        let processor = Processor::default();
        let rows = processor
            .process_select(&json!({"hits": {"hits": [{"_id": "9"}]}}))
            .unwrap();
        assert_eq!(Value::Object(rows[0].clone()), json!({"_id": "9"}));
    }

    #[test]
    fn test_empty_hits() {
        let processor = Processor::default();
        assert!(processor.process_select(&json!({"hits": {"hits": []}})).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_select() {
        let processor = Processor::default();
        for response in [
            json!({}),
            json!({"hits": {}}),
            json!({"hits": {"hits": {}}}),
            json!({"hits": {"hits": [{"_source": {}}]}}),
            json!({"hits": {"hits": [{"_id": "1", "_source": [1, 2]}]}}),
        ] {
            assert!(
                matches!(processor.process_select(&response), Err(ResponseError::Malformed { .. })),
                "expected malformed for {}",
                response
            );
        }
    }

    #[test]
    fn test_count() {
        let processor = Processor::default();
        assert_eq!(processor.process_count(&json!({"count": 7})), Ok(7));
        assert_eq!(processor.process_count(&json!({"count": 0, "_shards": {}})), Ok(0));
    }

    #[test]
    fn test_malformed_count() {
        let processor = Processor::default();
        assert!(matches!(
            processor.process_count(&json!({"hits": {}})),
            Err(ResponseError::Malformed { .. })
        ));
        assert!(processor.process_count(&json!({"count": "7"})).is_err());
        assert!(processor.process_count(&json!({"count": -1})).is_err());
    }
}
