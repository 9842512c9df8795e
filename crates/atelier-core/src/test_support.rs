//! Shared test doubles
//!
//! A scripted remote transport with call counting, used to assert that
//! guarded paths never reach the network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use reqwest::Method;
use serde_json::Value;

use crate::error::SyncError;
use crate::remote::RemoteTransport;

/// Scripted transport: replays queued responses in order and records
/// every request it sees. An exhausted queue yields a null payload.
pub(crate) struct StubTransport {
    responses: Mutex<VecDeque<Result<Option<Value>, SyncError>>>,
    requests: Mutex<Vec<(Method, String, Option<Value>)>>,
    calls: AtomicUsize,
}

impl StubTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push_response(&self, response: Result<Option<Value>, SyncError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(Method, String, Option<Value>)> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl RemoteTransport for StubTransport {
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((method, path.to_string(), body));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }
}
