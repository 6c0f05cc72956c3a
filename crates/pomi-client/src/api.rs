//! Typed auth API façade.
//!
//! Thin wrappers over the HTTP pipeline for the five auth operations.
//! Transport responses are translated into typed results here; the session
//! controller only ever sees [`crate::error::Error`].

use crate::error::Result;
use crate::http::ApiClient;
use crate::tokens::TokenStore;
use crate::types::{AuthResponse, RegisterRequest, User};

/// Auth API operations over an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    /// Creates the façade over an explicitly constructed client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The token store backing this façade's client.
    pub fn token_store(&self) -> &TokenStore {
        self.client.tokens()
    }

    /// Registers a new account.
    ///
    /// # Errors
    /// `Validation` when the server reports field-level issues, `Conflict`
    /// when the email or username is already taken.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let body = serde_json::to_value(request).map_err(anyhow::Error::from)?;
        self.client.post_json("/auth/register", &body).await
    }

    /// Logs in with email and password.
    ///
    /// # Errors
    /// `Auth` on invalid credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.client.post_json("/auth/login", &body).await
    }

    /// Exchanges a refresh token for a new access token. The refresh token
    /// is not rotated.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String> {
        self.client.refresh_access_token(refresh_token).await
    }

    /// Fetches the authenticated user.
    ///
    /// # Errors
    /// `Auth` if the bearer credential is missing or expired and the silent
    /// refresh did not recover it.
    pub async fn current_user(&self) -> Result<User> {
        self.client.get_json("/auth/me").await
    }

    /// Logs out: tells the server to invalidate the refresh token, then
    /// clears local tokens regardless of the server's answer. Local session
    /// teardown must not depend on network success.
    ///
    /// # Errors
    /// Returns the server-side failure, if any, after the local clear.
    pub async fn logout(&self) -> Result<()> {
        let result = match self.client.tokens().refresh_token()? {
            Some(refresh_token) => {
                let body = serde_json::json!({ "refreshToken": refresh_token });
                self.client.post_no_content("/auth/logout", &body).await
            }
            None => Ok(()),
        };

        // Guaranteed cleanup, even when the server call failed.
        let cleared = self.client.tokens().clear();

        result?;
        cleared.map_err(Into::into)
    }
}
