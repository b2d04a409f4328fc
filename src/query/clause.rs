// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Clause model
//!
//! Plain data describing what a query wants: targets, projection, filter
//! clauses, sort entries and pagination. Nothing here talks to a backend;
//! [`super::Grammar`] turns a [`QuerySpec`] into a wire document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ParseSortDirectionError;

/// Free-form per-clause parameters (boost, format, time_zone, flags, ...)
pub type Params = Map<String, Value>;

/// Boolean group a clause is compiled into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolGroup {
    /// Must match, does not contribute to score
    #[default]
    Filter,
    /// Must match, contributes to score
    Must,
    /// Must not match
    MustNot,
    /// Should match
    Should,
}

impl BoolGroup {
    /// Wire name of the group inside `query.bool`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Must => "must",
            Self::MustNot => "must_not",
            Self::Should => "should",
        }
    }

    /// Group negation used by the `where_not_*` family
    pub(crate) fn negated_if(not: bool) -> Self {
        if not { Self::MustNot } else { Self::Filter }
    }
}

impl std::fmt::Display for BoolGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a filter clause.
///
/// The built-in kinds each have a dedicated compiler rule. `Custom` carries an
/// operator token that has no built-in rule; it only compiles when a matching
/// extension has been registered on the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseKind {
    Term,
    Terms,
    Range,
    QueryString,
    Regex,
    Raw,
    Custom(String),
}

impl ClauseKind {
    /// Resolve a kind token (`term`, `query_string`, ...) to a kind.
    ///
    /// Tokens without a built-in rule become [`ClauseKind::Custom`].
    pub fn from_token(token: &str) -> Self {
        match token {
            "term" => Self::Term,
            "terms" => Self::Terms,
            "range" => Self::Range,
            "query_string" => Self::QueryString,
            "regex" | "regexp" => Self::Regex,
            "raw" => Self::Raw,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Whether this kind compiles without a registered extension
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Term => "term",
            Self::Terms => "terms",
            Self::Range => "range",
            Self::QueryString => "query_string",
            Self::Regex => "regex",
            Self::Raw => "raw",
            Self::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One filter condition, already resolved to its backend shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    /// Field name (empty for raw clauses)
    pub field: String,
    /// Clause kind
    pub kind: ClauseKind,
    /// Clause value: a scalar, a list for `terms`, bounds for `range`,
    /// or the whole document for `raw`
    pub value: Value,
    /// Boolean group
    pub group: BoolGroup,
    /// Extra parameters merged into the compiled clause
    #[serde(default)]
    pub params: Params,
}

impl WhereClause {
    /// Create a clause in the `filter` group with no params
    pub fn new(field: impl Into<String>, kind: ClauseKind, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            kind,
            value: value.into(),
            group: BoolGroup::Filter,
            params: Params::new(),
        }
    }

    /// Exact match: `{term: {field: {value}}}`
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, ClauseKind::Term, value)
    }

    /// Membership: `{terms: {field: [values]}}`
    pub fn terms<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self::new(field, ClauseKind::Terms, Value::Array(values))
    }

    /// Range with explicit bounds object (`{gte: .., lt: ..}`)
    pub fn range(field: impl Into<String>, bounds: Map<String, Value>) -> Self {
        Self::new(field, ClauseKind::Range, Value::Object(bounds))
    }

    /// Inclusive range `[from, to]`
    pub fn between(field: impl Into<String>, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        let mut bounds = Map::new();
        bounds.insert("gte".into(), from.into());
        bounds.insert("lte".into(), to.into());
        Self::range(field, bounds)
    }

    /// Full-text query string, scored (`must` group)
    pub fn query_string(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(field, ClauseKind::QueryString, Value::String(text.into()))
            .in_group(BoolGroup::Must)
    }

    /// Regular expression match
    pub fn regex(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, ClauseKind::Regex, Value::String(pattern.into()))
    }

    /// Pass-through clause, copied verbatim into its group
    pub fn raw(document: Value, group: BoolGroup) -> Self {
        Self::new(String::new(), ClauseKind::Raw, document).in_group(group)
    }

    /// Move the clause to another boolean group
    #[must_use]
    pub fn in_group(mut self, group: BoolGroup) -> Self {
        self.group = group;
        self
    }

    /// Attach one parameter (e.g. `boost`, `format`, `time_zone`)
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Attach several parameters at once
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = ParseSortDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ParseSortDirectionError(s.to_string())),
        }
    }
}

/// One sort entry: `{order, mode?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub order: SortDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// Collections a query runs against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub indices: Vec<String>,
    pub types: Vec<String>,
}

/// Source filtering: which fields each hit returns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    /// Empty means include-all; `*` leads the list when fields were added to it
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

impl Projection {
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    /// Replace the include list; `*` anywhere means include-all
    pub(crate) fn set_includes(&mut self, fields: Vec<String>) {
        self.includes = if fields.iter().any(|f| f == "*") { Vec::new() } else { fields };
    }

    /// Extend the include list. Adding `*` makes it include-all again, and
    /// extending include-all keeps `*` in front of the new fields.
    pub(crate) fn add_includes(&mut self, fields: Vec<String>) {
        if fields.iter().any(|f| f == "*") {
            self.includes.clear();
            return;
        }
        if fields.is_empty() {
            return;
        }
        if self.includes.is_empty() {
            self.includes.push("*".to_string());
        }
        self.includes.extend(fields);
    }
}

/// Accumulated query state.
///
/// Owned by one builder. Derived queries (count, one-off column overrides)
/// work on a clone so the owner's state never changes underneath it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub target: Target,
    pub projection: Projection,
    pub filters: Vec<WhereClause>,
    /// Insertion-ordered; the first entry is the primary sort
    pub sorts: Vec<(String, SortSpec)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a sort entry, keeping the position of first insertion.
    ///
    /// Redefining a field without a mode keeps the mode set earlier.
    pub fn set_sort(&mut self, field: &str, order: SortDirection, mode: Option<String>) {
        match self.sorts.iter_mut().find(|(name, _)| name == field) {
            Some((_, existing)) => {
                existing.order = order;
                if mode.is_some() {
                    existing.mode = mode;
                }
            }
            None => self.sorts.push((field.to_string(), SortSpec { order, mode })),
        }
    }

    /// Clone without pagination, sort and projection, for count requests
    pub fn for_count(&self) -> Self {
        Self {
            target: self.target.clone(),
            projection: Projection::default(),
            filters: self.filters.clone(),
            sorts: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_from_token() {
        assert_eq!(ClauseKind::from_token("term"), ClauseKind::Term);
        assert_eq!(ClauseKind::from_token("query_string"), ClauseKind::QueryString);
        assert_eq!(ClauseKind::from_token("regexp"), ClauseKind::Regex);
        assert_eq!(ClauseKind::from_token("match"), ClauseKind::Custom("match".into()));
    }

    #[test]
    fn test_between_bounds() {
        let clause = WhereClause::between("age", 18, 65);
        assert_eq!(clause.kind, ClauseKind::Range);
        assert_eq!(clause.value, json!({"gte": 18, "lte": 65}));
        assert_eq!(clause.group, BoolGroup::Filter);
    }

    #[test]
    fn test_query_string_defaults_to_must() {
        let clause = WhereClause::query_string("body", "rust AND search");
        assert_eq!(clause.group, BoolGroup::Must);
    }

    #[test]
    fn test_with_params() {
        let clause = WhereClause::between("created", "2024-01-01", "2024-12-31")
            .with_param("format", "yyyy-MM-dd")
            .with_param("time_zone", "+01:00");
        assert_eq!(clause.params.get("format"), Some(&json!("yyyy-MM-dd")));
        assert_eq!(clause.params.len(), 2);
    }

    #[test]
    fn test_sort_redefinition_keeps_position_and_mode() {
        let mut spec = QuerySpec::new();
        spec.set_sort("price", SortDirection::Asc, Some("min".into()));
        spec.set_sort("name", SortDirection::Asc, None);
        spec.set_sort("price", SortDirection::Desc, None);

        assert_eq!(spec.sorts[0].0, "price");
        assert_eq!(spec.sorts[0].1.order, SortDirection::Desc);
        assert_eq!(spec.sorts[0].1.mode.as_deref(), Some("min"));
        assert_eq!(spec.sorts[1].0, "name");
    }

    #[test]
    fn test_projection_star_is_include_all() {
        let mut projection = Projection::default();
        projection.set_includes(vec!["a".into(), "b".into()]);
        assert_eq!(projection.includes.len(), 2);
        projection.set_includes(vec!["*".into()]);
        assert!(projection.includes.is_empty());
    }

    #[test]
    fn test_for_count_strips_paging() {
        let mut spec = QuerySpec::new();
        spec.projection.set_includes(vec!["name".into()]);
        spec.filters.push(WhereClause::term("status", "active"));
        spec.set_sort("name", SortDirection::Asc, None);
        spec.limit = Some(10);
        spec.offset = Some(20);

        let count = spec.for_count();
        assert!(count.projection.is_empty());
        assert!(count.sorts.is_empty());
        assert_eq!(count.limit, None);
        assert_eq!(count.offset, None);
        assert_eq!(count.filters, spec.filters);
        // original untouched
        assert_eq!(spec.limit, Some(10));
    }

    #[test]
    fn test_add_includes_keeps_include_all() {
        let mut projection = Projection::default();
        projection.add_includes(vec!["extra".into()]);
        assert_eq!(projection.includes, vec!["*", "extra"]);

        projection.add_includes(vec!["more".into()]);
        assert_eq!(projection.includes, vec!["*", "extra", "more"]);

        let mut projection = Projection::default();
        projection.set_includes(vec!["name".into()]);
        projection.add_includes(vec!["age".into()]);
        assert_eq!(projection.includes, vec!["name", "age"]);

        projection.add_includes(vec!["*".into()]);
        assert!(projection.includes.is_empty());

        projection.add_includes(Vec::new());
        assert!(projection.is_empty());
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert_eq!(
            "sideways".parse::<SortDirection>(),
            Err(ParseSortDirectionError("sideways".into()))
        );
    }
}
