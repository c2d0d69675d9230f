//! Scripted request/response authority.
//!
//! Responses are queued per path and consumed in order; a path can also have
//! a standing response used once its queue is empty. Every request is
//! recorded so tests can assert on what was asked and with which parameters.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;

use crate::error::TransportError;
use crate::port::{Method, RequestTransport};

/// One request as seen by the scripted authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Holds a scripted response back until opened.
#[derive(Clone, Default)]
pub struct Gate {
    notify: Arc<Notify>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release the response waiting on this gate.
    pub fn open(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone)]
enum Reply {
    Body(Value),
    Fail(String),
    Gated(Value, Gate),
}

#[derive(Default)]
struct Inner {
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    standing: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<RecordedCall>>,
}

/// Request transport that answers from a script. Clones share state.
#[derive(Clone, Default)]
pub struct ScriptedAuthority {
    inner: Arc<Inner>,
}

impl ScriptedAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one response for `path`.
    pub fn respond(&self, path: &str, body: Value) -> &Self {
        self.enqueue(path, Reply::Body(body))
    }

    /// Queue one failure for `path`.
    pub fn fail(&self, path: &str, reason: &str) -> &Self {
        self.enqueue(path, Reply::Fail(reason.to_string()))
    }

    /// Queue one response for `path` that completes only once `gate` opens.
    pub fn respond_when(&self, path: &str, body: Value, gate: &Gate) -> &Self {
        self.enqueue(path, Reply::Gated(body, gate.clone()))
    }

    /// Answer `path` with `body` whenever its queue is empty.
    pub fn always(&self, path: &str, body: Value) -> &Self {
        self.inner
            .standing
            .lock()
            .insert(path.to_string(), Reply::Body(body));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.calls.lock().clone()
    }

    /// Number of requests made to `path`.
    pub fn calls_to(&self, path: &str) -> usize {
        self.inner
            .calls
            .lock()
            .iter()
            .filter(|call| call.path == path)
            .count()
    }

    /// Most recent request made to `path`.
    pub fn last_call(&self, path: &str) -> Option<RecordedCall> {
        self.inner
            .calls
            .lock()
            .iter()
            .rev()
            .find(|call| call.path == path)
            .cloned()
    }

    fn enqueue(&self, path: &str, reply: Reply) -> &Self {
        self.inner
            .queued
            .lock()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    fn next_reply(&self, path: &str) -> Option<Reply> {
        let queued = self
            .inner
            .queued
            .lock()
            .get_mut(path)
            .and_then(VecDeque::pop_front);
        queued.or_else(|| self.inner.standing.lock().get(path).cloned())
    }
}

#[async_trait]
impl RequestTransport for ScriptedAuthority {
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value, TransportError> {
        self.inner.calls.lock().push(RecordedCall {
            method,
            path: path.to_string(),
            params: params
                .iter()
                .map(|(key, value)| ((*key).to_string(), value.clone()))
                .collect(),
        });

        match self.next_reply(path) {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Fail(reason)) => Err(TransportError::Network(reason)),
            Some(Reply::Gated(body, gate)) => {
                gate.notify.notified().await;
                Ok(body)
            }
            None => Err(TransportError::Network(format!(
                "no scripted response for {path}"
            ))),
        }
    }
}
