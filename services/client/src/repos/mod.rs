//! services/client/src/repos/mod.rs
//!
//! The data-access repositories. Each one owns the cached list of one REST
//! resource plus its loading and error flags, and talks to the backend
//! through a shared `Gateway`.

pub mod auth;
pub mod files;
pub mod projects;
mod records;
pub mod scripts;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::AuthClient;
pub use files::FileRepository;
pub use projects::{ProjectFilter, ProjectRepository};
pub use scripts::ScriptRepository;
pub use state::ResourceState;

use podscript_core::domain::Credential;
use podscript_core::ports::{
    ApiRequest, ApiResponse, Envelope, ErrorKind, SessionStore, Transport, TransportError,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

//=========================================================================================
// Gateway
//=========================================================================================

/// The transport and the session store, passed explicitly to every repository.
#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStore>,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<dyn SessionStore>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Returns the active credential, or fails without touching the network.
    pub fn credential(&self) -> Result<Credential, ErrorKind> {
        match self.session.get() {
            Some(credential) => Ok(credential),
            None => {
                self.forget_credential();
                Err(ErrorKind::Unauthenticated)
            }
        }
    }

    /// Sends a request with the bearer credential attached.
    ///
    /// A 401 clears the stored credential before `Unauthenticated` is returned.
    pub async fn authorized(
        &self,
        request: ApiRequest,
        fallback: &str,
        cancel: &CancellationToken,
    ) -> Result<Envelope, ErrorKind> {
        let credential = self.credential()?;
        let outcome = self.dispatch(request.bearer(credential), cancel).await?;
        let result = classify(outcome, fallback, true);
        if matches!(result, Err(ErrorKind::Unauthenticated)) {
            self.forget_credential();
        }
        result
    }

    /// Sends a request without a credential, as login and registration do.
    /// A 401 here is just a rejection carrying the server's message.
    pub async fn public(
        &self,
        request: ApiRequest,
        fallback: &str,
        cancel: &CancellationToken,
    ) -> Result<Envelope, ErrorKind> {
        let outcome = self.dispatch(request, cancel).await?;
        classify(outcome, fallback, false)
    }

    async fn dispatch(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<Result<ApiResponse, TransportError>, ErrorKind> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ErrorKind::Cancelled),
            outcome = self.transport.send(request) => Ok(outcome),
        }
    }

    pub(crate) fn forget_credential(&self) {
        if let Err(e) = self.session.clear() {
            warn!("Failed to clear credential: {}", e);
        }
    }
}

//=========================================================================================
// Classification and Decoding
//=========================================================================================

/// Turns a transport outcome into either a successful envelope or one error kind.
pub(crate) fn classify(
    outcome: Result<ApiResponse, TransportError>,
    fallback: &str,
    auth_required: bool,
) -> Result<Envelope, ErrorKind> {
    let response = match outcome {
        Ok(response) => response,
        Err(TransportError::Timeout) => return Err(ErrorKind::Timeout),
        Err(TransportError::Unreachable(_)) => return Err(ErrorKind::NetworkUnavailable),
        Err(TransportError::Decode(detail)) => return Err(ErrorKind::MalformedResponse(detail)),
    };

    if auth_required && response.status == 401 {
        return Err(ErrorKind::Unauthenticated);
    }

    let message = |envelope: &Option<Envelope>| {
        envelope
            .as_ref()
            .and_then(|e| e.message.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    };

    if !response.is_success_status() {
        return Err(ErrorKind::ServerRejected(message(&response.envelope)));
    }
    match response.envelope {
        Some(envelope) if envelope.is_success() => Ok(envelope),
        other => Err(ErrorKind::ServerRejected(message(&other))),
    }
}

/// Decodes `data` as a list; a missing or null `data` is an empty list.
pub(crate) fn decode_list<T: DeserializeOwned>(envelope: Envelope) -> Result<Vec<T>, ErrorKind> {
    match envelope.data {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(data) => {
            serde_json::from_value(data).map_err(|e| ErrorKind::MalformedResponse(e.to_string()))
        }
    }
}

/// Decodes `data` as a single record, which must be present.
pub(crate) fn decode_one<T: DeserializeOwned>(envelope: Envelope) -> Result<T, ErrorKind> {
    match envelope.data {
        None | Some(serde_json::Value::Null) => Err(ErrorKind::MalformedResponse(
            "response carried no data".to_string(),
        )),
        Some(data) => {
            serde_json::from_value(data).map_err(|e| ErrorKind::MalformedResponse(e.to_string()))
        }
    }
}

/// Races a local suspension point against the caller's cancellation token.
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    work: impl std::future::Future<Output = Result<T, ErrorKind>>,
) -> Result<T, ErrorKind> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ErrorKind::Cancelled),
        result = work => result,
    }
}
