//! Scripted transport for tests.
//!
//! [`RecordingTransport`] answers requests from a queue of canned replies and records every
//! request it receives, so tests can assert on paths, queries and encoded bodies without a
//! network.

use crate::client::ApiClient;
use crate::envelope::ApiResponse;
use crate::transport::{ApiReply, ApiRequest, Transport};
use crate::{ClientError, ClientResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

enum Scripted {
    Reply(ApiReply),
    Fail(String),
}

#[derive(Default)]
struct Inner {
    replies: VecDeque<Scripted>,
    requests: Vec<ApiRequest>,
}

/// Transport fake that replays queued replies in order.
///
/// When the queue is empty it answers `500` so a missing script shows up as a test failure
/// rather than a hang.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, scripted: Scripted) {
        self.lock().replies.push_back(scripted);
    }

    /// Queue a raw reply.
    pub fn reply(&self, reply: ApiReply) {
        self.push(Scripted::Reply(reply));
    }

    /// Queue a `200` envelope around `data`.
    pub fn reply_ok(&self, data: serde_json::Value) {
        let envelope = ApiResponse::new(200, "OK", data);
        let body = serde_json::to_vec(&envelope).unwrap_or_default();
        self.reply(ApiReply::new(200, body));
    }

    /// Queue an error envelope with `status` and `message`.
    pub fn reply_error(&self, status: u16, message: &str) {
        let envelope = ApiResponse::new(status, message, serde_json::Value::Null);
        let body = serde_json::to_vec(&envelope).unwrap_or_default();
        self.reply(ApiReply::new(status, body));
    }

    /// Queue a transport-level failure (no response at all).
    pub fn fail(&self, message: &str) {
        self.push(Scripted::Fail(message.to_owned()));
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// An [`ApiClient`] backed by this transport.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(Arc::new(self.clone()))
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiReply> {
        let scripted = {
            let mut inner = self.lock();
            inner.requests.push(request);
            inner.replies.pop_front()
        };
        match scripted {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Fail(message)) => Err(ClientError::Transport(message.into())),
            None => Ok(ApiReply::new(500, &b"{\"message\":\"no scripted reply\"}"[..])),
        }
    }
}
