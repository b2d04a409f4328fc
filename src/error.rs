// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error types.
//!
//! Every failure reaches the caller: nothing is logged and swallowed, and a
//! query either compiles and executes completely or fails before any row is
//! returned.

use thiserror::Error;

pub use crate::transport::TransportError;

/// Raised while compiling a QuerySpec into a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("no compiler rule for clause kind '{0}'")]
    UnknownClauseKind(String),
    #[error("range on '{field}' needs an object of bounds")]
    InvalidRangeBounds { field: String },
}

/// Raised when parsing a sort direction other than `asc`/`desc`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sort direction '{0}'")]
pub struct ParseSortDirectionError(pub String);

/// Raised when a backend response lacks the expected envelope
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("malformed response: {reason}")]
    Malformed { reason: String },
}

impl ResponseError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed { reason: reason.into() }
    }
}

/// Top-level error for every builder and connection operation
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("operation '{operation}' is not supported by the search connection")]
    Unsupported { operation: &'static str },
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Response(#[from] ResponseError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl QueryError {
    pub(crate) fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }

    /// Whether this is an unsupported-operation error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = QueryError::unsupported("insert");
        assert_eq!(err.to_string(), "operation 'insert' is not supported by the search connection");
        assert!(err.is_unsupported());

        let err: QueryError = CompileError::UnknownClauseKind("geo_shape".into()).into();
        assert_eq!(err.to_string(), "no compiler rule for clause kind 'geo_shape'");

        let err: QueryError = CompileError::InvalidRangeBounds { field: "age".into() }.into();
        assert_eq!(err.to_string(), "range on 'age' needs an object of bounds");

        let err = ParseSortDirectionError("up".into());
        assert_eq!(err.to_string(), "unknown sort direction 'up'");

        let err: QueryError = ResponseError::malformed("missing 'count'").into();
        assert_eq!(err.to_string(), "malformed response: missing 'count'");
    }

    #[test]
    fn test_transport_error_wraps() {
        let err: QueryError = TransportError::Timeout.into();
        assert!(matches!(err, QueryError::Transport(TransportError::Timeout)));
        assert!(!err.is_unsupported());
    }
}
