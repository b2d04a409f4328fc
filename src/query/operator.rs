// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Operator tokens
//!
//! Maps the relational-style operator a caller writes (`=`, `<>`, `>=`, ...)
//! onto the clause kind, boolean group and value shape the backend expects.
//!
//! ```text
//! =          → term   / filter
//! != , <>    → term   / must_not
//! >= > <= <  → range  / filter   value wrapped as {gte|gt|lte|lt: value}
//! other      → kind named by the token / filter
//! ```

use serde_json::{Map, Value};

use super::clause::{BoolGroup, ClauseKind};

/// A parsed comparison operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Gte,
    Gt,
    Lte,
    Lt,
    /// Any other token, naming a clause kind directly
    Kind(ClauseKind),
}

impl Operator {
    pub fn parse(token: &str) -> Self {
        match token {
            "=" => Self::Eq,
            "!=" | "<>" => Self::NotEq,
            ">=" => Self::Gte,
            ">" => Self::Gt,
            "<=" => Self::Lte,
            "<" => Self::Lt,
            other => Self::Kind(ClauseKind::from_token(other)),
        }
    }

    /// Resolve into `(kind, default group, transformed value)`
    pub fn resolve(self, value: Value) -> (ClauseKind, BoolGroup, Value) {
        match self {
            Self::Eq => (ClauseKind::Term, BoolGroup::Filter, value),
            Self::NotEq => (ClauseKind::Term, BoolGroup::MustNot, value),
            Self::Gte => (ClauseKind::Range, BoolGroup::Filter, bound("gte", value)),
            Self::Gt => (ClauseKind::Range, BoolGroup::Filter, bound("gt", value)),
            Self::Lte => (ClauseKind::Range, BoolGroup::Filter, bound("lte", value)),
            Self::Lt => (ClauseKind::Range, BoolGroup::Filter, bound("lt", value)),
            Self::Kind(kind) => (kind, BoolGroup::Filter, value),
        }
    }
}

fn bound(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(token: &str, value: Value) -> (ClauseKind, BoolGroup, Value) {
        Operator::parse(token).resolve(value)
    }

    #[test]
    fn test_equality_operators() {
        assert_eq!(resolve("=", json!(5)), (ClauseKind::Term, BoolGroup::Filter, json!(5)));
        assert_eq!(resolve("!=", json!(5)), (ClauseKind::Term, BoolGroup::MustNot, json!(5)));
        assert_eq!(resolve("<>", json!("x")), (ClauseKind::Term, BoolGroup::MustNot, json!("x")));
    }

    #[test]
    fn test_range_operators() {
        assert_eq!(resolve(">=", json!(1)), (ClauseKind::Range, BoolGroup::Filter, json!({"gte": 1})));
        assert_eq!(resolve(">", json!(1)), (ClauseKind::Range, BoolGroup::Filter, json!({"gt": 1})));
        assert_eq!(resolve("<=", json!(1)), (ClauseKind::Range, BoolGroup::Filter, json!({"lte": 1})));
        assert_eq!(resolve("<", json!(1)), (ClauseKind::Range, BoolGroup::Filter, json!({"lt": 1})));
    }

    #[test]
    fn test_kind_tokens_pass_through() {
        assert_eq!(
            resolve("terms", json!([1, 2])),
            (ClauseKind::Terms, BoolGroup::Filter, json!([1, 2]))
        );
        assert_eq!(
            resolve("geo_distance", json!({"distance": "1km"})),
            (ClauseKind::Custom("geo_distance".into()), BoolGroup::Filter, json!({"distance": "1km"}))
        );
    }
}
