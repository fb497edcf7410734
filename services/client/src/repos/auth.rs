//! services/client/src/repos/auth.rs
//!
//! Login, registration and the current-user lookup. A successful login is
//! the only place a credential is created.

use podscript_core::domain::{Credential, User};
use podscript_core::ports::{ApiRequest, ErrorKind, SessionStore};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::records::{TokenRecord, UserRecord};
use super::{decode_one, Gateway};

/// Authentication endpoints plus the session side effects they imply.
#[derive(Clone)]
pub struct AuthClient {
    gateway: Gateway,
}

impl AuthClient {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Logs in and stores the credential. `remember` keeps it for seven days.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember: bool,
        cancel: &CancellationToken,
    ) -> Result<(), ErrorKind> {
        let body = json!({ "email": email, "password": password });
        self.authenticate("auth/login", body, remember, "Login failed. Please try again.", cancel)
            .await
    }

    /// Creates an account and logs straight into it.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        remember: bool,
        cancel: &CancellationToken,
    ) -> Result<(), ErrorKind> {
        let body = json!({ "name": name, "email": email, "password": password });
        self.authenticate(
            "auth/register",
            body,
            remember,
            "Registration failed. Please try again.",
            cancel,
        )
        .await
    }

    /// The user the stored credential belongs to.
    pub async fn me(&self, cancel: &CancellationToken) -> Result<User, ErrorKind> {
        current_user(&self.gateway, cancel).await
    }

    pub fn is_logged_in(&self) -> bool {
        self.gateway.session().get().is_some()
    }

    /// Forgets the stored credential. Nothing is sent to the backend.
    pub fn logout(&self) {
        self.gateway.forget_credential();
        info!("Logged out.");
    }

    async fn authenticate(
        &self,
        path: &str,
        body: Value,
        remember: bool,
        fallback: &str,
        cancel: &CancellationToken,
    ) -> Result<(), ErrorKind> {
        let envelope = self
            .gateway
            .public(ApiRequest::post(path).json(body), fallback, cancel)
            .await?;
        let record: TokenRecord = decode_one(envelope)?;

        // If the credential cannot be stored the user is, in effect, not logged in.
        if let Err(e) = self
            .gateway
            .session()
            .set(Credential::new(record.token), remember)
        {
            warn!("Could not store credential: {}", e);
            return Err(ErrorKind::Unauthenticated);
        }
        info!("Authenticated via {} (remember: {})", path, remember);
        Ok(())
    }
}

/// Looks up the authenticated user; projects use it to find their owner.
pub(crate) async fn current_user(
    gateway: &Gateway,
    cancel: &CancellationToken,
) -> Result<User, ErrorKind> {
    let envelope = gateway
        .authorized(ApiRequest::get("auth/me"), "Failed to fetch user data", cancel)
        .await?;
    let record: UserRecord = decode_one(envelope)?;
    Ok(record.into_domain())
}
