use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use super::traits::{SearchTransport, TransportError};
use crate::query::QueryDocument;

/// Which request a recorded document was sent with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Search,
    Count,
}

/// In-memory transport that replays queued responses.
///
/// Every document it receives is recorded, so callers can assert on exactly
/// what would have gone over the wire. With nothing queued it answers with an
/// empty hit list or a zero count.
pub struct RecordingTransport {
    search_responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    count_responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    requests: Mutex<Vec<(RequestKind, QueryDocument)>>,
}

impl RecordingTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            search_responses: Mutex::new(VecDeque::new()),
            count_responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue the next search response
    pub fn push_search(&self, response: Result<Value, TransportError>) {
        self.search_responses.lock().push_back(response);
    }

    /// Queue the next count response
    pub fn push_count(&self, response: Result<Value, TransportError>) {
        self.count_responses.lock().push_back(response);
    }

    /// Queue a search response built from `(id, source)` pairs
    pub fn push_hits<I>(&self, hits: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let hits: Vec<Value> = hits
            .into_iter()
            .map(|(id, source)| json!({"_id": id, "_source": source}))
            .collect();
        self.push_search(Ok(json!({"hits": {"hits": hits}})));
    }

    /// All documents received so far, oldest first
    #[must_use]
    pub fn requests(&self) -> Vec<(RequestKind, QueryDocument)> {
        self.requests.lock().clone()
    }

    /// The most recent document received
    #[must_use]
    pub fn last_request(&self) -> Option<(RequestKind, QueryDocument)> {
        self.requests.lock().last().cloned()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchTransport for RecordingTransport {
    async fn search(&self, document: &QueryDocument) -> Result<Value, TransportError> {
        self.requests.lock().push((RequestKind::Search, document.clone()));
        self.search_responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"hits": {"hits": []}})))
    }

    async fn count(&self, document: &QueryDocument) -> Result<Value, TransportError> {
        self.requests.lock().push((RequestKind::Count, document.clone()));
        self.count_responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"count": 0})))
    }
}
