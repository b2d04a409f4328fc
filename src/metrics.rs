// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for elastic-query.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host application is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `elastic_query_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `operation`: search, count
//! - `status`: success, compile_error, transport_error, malformed, unsupported

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

use crate::error::QueryError;

/// Record one query execution outcome
pub fn record_request(operation: &str, status: &str) {
    counter!(
        "elastic_query_requests_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record the outcome of a finished execution
pub fn record_result<T>(operation: &str, result: &Result<T, QueryError>) {
    let status = match result {
        Ok(_) => "success",
        Err(QueryError::Unsupported { .. }) => "unsupported",
        Err(QueryError::Compile(_)) => "compile_error",
        Err(QueryError::Response(_)) => "malformed",
        Err(QueryError::Transport(_)) => "transport_error",
    };
    record_request(operation, status);
}

/// Record round-trip latency of a transport call
pub fn record_latency(operation: &str, duration: Duration) {
    histogram!(
        "elastic_query_request_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record number of rows returned by a search
pub fn record_rows(count: usize) {
    histogram!("elastic_query_rows_returned").record(count as f64);
}

/// Record an attempted call to an unsupported operation
pub fn record_unsupported(operation: &str) {
    counter!(
        "elastic_query_unsupported_calls_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// A timing guard that records latency on drop
pub struct LatencyTimer {
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_latency(self.operation, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;

    // No recorder is installed; these check the calls are well-formed and don't panic.

    #[test]
    fn test_record_request() {
        record_request("search", "success");
        record_request("count", "transport_error");
    }

    #[test]
    fn test_record_result_statuses() {
        let ok: Result<u64, QueryError> = Ok(3);
        record_result("count", &ok);
        let err: Result<u64, QueryError> = Err(CompileError::UnknownClauseKind("x".into()).into());
        record_result("search", &err);
    }

    #[test]
    fn test_latency_timer() {
        {
            let _timer = LatencyTimer::new("search");
            std::thread::sleep(Duration::from_micros(10));
        }
        record_rows(12);
        record_unsupported("insert");
    }
}
