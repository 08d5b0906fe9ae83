use crate::llm::service::{CompletionRequest, CompletionService, ServiceError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Structured payload returned as-is.
    Payload(Value),
    /// The service answered without a structured payload.
    Empty,
    /// The service failed with the given HTTP status.
    Fail { status: u16, body: String },
}

/// Deterministic [`CompletionService`] replaying queued replies.
///
/// Every request is recorded and takes the next reply at dispatch time, even
/// if the caller later abandons it. Once the queue is drained the `fallback` reply
/// is used for all further calls.
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<ScriptedReply>>,
    fallback: ScriptedReply,
    latency: Duration,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            fallback: ScriptedReply::Fail {
                status: 503,
                body: "no scripted reply left".to_string(),
            },
            latency: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers every call with the same reply.
    pub fn always(reply: ScriptedReply) -> Self {
        Self::new([]).with_fallback(reply)
    }

    pub fn with_fallback(mut self, reply: ScriptedReply) -> Self {
        self.fallback = reply;
        self
    }

    /// Simulated round-trip time applied before each reply.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<Option<Value>, ServiceError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match reply {
            ScriptedReply::Payload(value) => Ok(Some(value)),
            ScriptedReply::Empty => Ok(None),
            ScriptedReply::Fail { status, body } => Err(ServiceError::Status { status, body }),
        }
    }
}
