//! Session controller: in-memory user/loading/error state over the auth API.
//!
//! `loading` is true only strictly between the start and completion of one
//! in-flight operation; `error` is cleared at the start of every attempt
//! and on explicit [`Session::clear_error`].

use crate::api::AuthApi;
use crate::error::Result;
use crate::tokens::mask_token;
use crate::types::{RegisterRequest, User};

/// UI-facing session state and operations.
#[derive(Debug)]
pub struct Session {
    api: AuthApi,
    user: Option<User>,
    loading: bool,
    error: Option<String>,
}

impl Session {
    /// Creates a controller over the given façade. No network activity
    /// happens until [`Session::restore`] or an explicit operation.
    pub fn new(api: AuthApi) -> Self {
        Self {
            api,
            user: None,
            loading: false,
            error: None,
        }
    }

    /// The façade this controller composes.
    pub fn api(&self) -> &AuthApi {
        &self.api
    }

    /// Restores a previous session from stored tokens, if any.
    ///
    /// A present-but-invalid token is treated as logged-out, not as an
    /// error shown to the user: on failure the tokens are cleared, `user`
    /// stays `None` and `error` stays untouched.
    pub async fn restore(&mut self) {
        if !self.api.token_store().has_access_token() {
            return;
        }

        self.loading = true;
        match self.api.current_user().await {
            Ok(user) => {
                tracing::debug!(user = %user.username, "session restored");
                self.user = Some(user);
            }
            Err(err) => {
                tracing::debug!(error = %err, "stored token rejected, treating as logged out");
                if let Err(err) = self.api.token_store().clear() {
                    tracing::warn!(error = %err, "failed to clear stale tokens");
                }
            }
        }
        self.loading = false;
    }

    /// Registers a new account and signs the user in.
    ///
    /// # Errors
    /// Re-returns the failure after recording it in `error`, so callers can
    /// react (e.g. keep a form open).
    pub async fn register(&mut self, request: &RegisterRequest) -> Result<()> {
        self.begin();
        let result = self.register_inner(request).await;
        self.finish(&result);
        result
    }

    async fn register_inner(&mut self, request: &RegisterRequest) -> Result<()> {
        let response = self.api.register(request).await?;
        self.api.token_store().store(&response.tokens)?;
        tracing::debug!(
            user = %response.user.username,
            token = %mask_token(&response.tokens.access_token),
            "registered"
        );
        self.user = Some(response.user);
        Ok(())
    }

    /// Logs in with email and password.
    ///
    /// # Errors
    /// Re-returns the failure after recording it in `error`.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        self.begin();
        let result = self.login_inner(email, password).await;
        self.finish(&result);
        result
    }

    async fn login_inner(&mut self, email: &str, password: &str) -> Result<()> {
        let response = self.api.login(email, password).await?;
        self.api.token_store().store(&response.tokens)?;
        tracing::debug!(
            user = %response.user.username,
            token = %mask_token(&response.tokens.access_token),
            "logged in"
        );
        self.user = Some(response.user);
        Ok(())
    }

    /// Logs out. Best-effort server-side: a failed network call is captured
    /// in `error` but never blocks the local teardown; `user` is cleared
    /// unconditionally (tokens are cleared inside the façade).
    pub async fn logout(&mut self) {
        self.begin();
        if let Err(err) = self.api.logout().await {
            tracing::warn!(error = %err, "server-side logout failed");
            self.error = Some(err.to_string());
        }
        self.user = None;
        self.loading = false;
    }

    /// Unconditionally clears the surfaced error. No side effects.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// The signed-in user, if validation has succeeded.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether an operation is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The message of the last failed operation, if not yet cleared.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Based on a validated `user`, deliberately not on token presence: a
    /// present-but-invalid token must not read as authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn finish(&mut self, result: &Result<()>) {
        if let Err(err) = result {
            self.error = Some(err.to_string());
        }
        self.loading = false;
    }
}
