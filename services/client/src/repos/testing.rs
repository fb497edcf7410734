//! A scripted `Transport` double for repository tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use podscript_core::domain::Credential;
use podscript_core::ports::{
    ApiRequest, ApiResponse, Envelope, SessionStore, StorageError, Transport, TransportError,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::oneshot;

use super::Gateway;
use crate::adapters::MemorySessionStore;

type Outcome = Result<ApiResponse, TransportError>;

enum Scripted {
    Ready(Outcome),
    Deferred(oneshot::Receiver<Outcome>),
}

/// Answers requests in the order the answers were queued and records every request.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    answers: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn push(&self, outcome: Outcome) {
        self.answers.lock().push_back(Scripted::Ready(outcome));
    }

    /// Queues an answer that is only delivered once the returned sender fires.
    pub(crate) fn push_deferred(&self) -> oneshot::Sender<Outcome> {
        let (tx, rx) = oneshot::channel();
        self.answers.lock().push_back(Scripted::Deferred(rx));
        tx
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.calls.lock().push(request);
        let answer = self.answers.lock().pop_front();
        match answer {
            Some(Scripted::Ready(outcome)) => outcome,
            Some(Scripted::Deferred(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(TransportError::Unreachable("answer dropped".into()))),
            None => Err(TransportError::Unreachable("no scripted answer".into())),
        }
    }
}

pub(crate) fn envelope(value: Value) -> Envelope {
    serde_json::from_value(value).unwrap()
}

pub(crate) fn response(status: u16, envelope: Option<Envelope>) -> ApiResponse {
    ApiResponse { status, envelope }
}

/// A 200 with `{success: true, ...body}`.
pub(crate) fn ok(body: Value) -> Outcome {
    let mut body = body;
    body["success"] = Value::Bool(true);
    Ok(response(200, Some(envelope(body))))
}

/// A response carrying `{success: false, message}`.
pub(crate) fn rejected(status: u16, message: &str) -> Outcome {
    Ok(response(
        status,
        Some(envelope(serde_json::json!({"success": false, "message": message}))),
    ))
}

/// A gateway over a fresh scripted transport and a logged-in memory session.
pub(crate) fn logged_in() -> (Gateway, Arc<ScriptedTransport>, Arc<MemorySessionStore>) {
    let transport = Arc::new(ScriptedTransport::default());
    let session = Arc::new(MemorySessionStore::with_credential(Credential::new("tok")));
    let gateway = Gateway::new(transport.clone(), session.clone());
    (gateway, transport, session)
}

/// Same as `logged_in`, but without a credential.
pub(crate) fn logged_out() -> (Gateway, Arc<ScriptedTransport>, Arc<MemorySessionStore>) {
    let transport = Arc::new(ScriptedTransport::default());
    let session = Arc::new(MemorySessionStore::new());
    let gateway = Gateway::new(transport.clone(), session.clone());
    (gateway, transport, session)
}

/// A memory session that counts how often it was cleared.
#[derive(Default)]
pub(crate) struct CountingSession {
    inner: MemorySessionStore,
    clears: std::sync::atomic::AtomicUsize,
}

impl CountingSession {
    pub(crate) fn with_credential(credential: Credential) -> Self {
        Self {
            inner: MemorySessionStore::with_credential(credential),
            clears: Default::default(),
        }
    }

    pub(crate) fn clears(&self) -> usize {
        self.clears.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl SessionStore for CountingSession {
    fn get(&self) -> Option<Credential> {
        self.inner.get()
    }

    fn set(
        &self,
        credential: Credential,
        persistent: bool,
    ) -> Result<(), StorageError> {
        self.inner.set(credential, persistent)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.clears.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.inner.clear()
    }
}
