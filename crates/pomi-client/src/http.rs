//! HTTP dispatch with bearer credentials and single-shot refresh on denial.
//!
//! Every outgoing request goes through one pipeline: the stored access
//! token (if any) is attached as a bearer credential, and an authorization
//! denial (HTTP 403) triggers exactly one silent refresh-and-retry before
//! the failure is surfaced. The attempt counter is a per-call local, so a
//! refresh endpoint that itself starts denying cannot loop.

use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::tokens::{TokenStore, mask_token};

/// HTTP client for the Pomi API.
///
/// Explicitly constructed and injected wherever it is needed; there is no
/// process-global instance.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
}

impl ApiClient {
    /// Creates a client with the transport's default timeout.
    pub fn new(base_url: impl Into<String>, tokens: TokenStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            tokens,
        }
    }

    /// Creates a client with an explicit request timeout (0 disables).
    ///
    /// # Errors
    /// Returns an error if the underlying client cannot be built.
    pub fn with_timeout(
        base_url: impl Into<String>,
        tokens: TokenStore,
        timeout_secs: u64,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.into(),
            tokens,
        })
    }

    /// The token store backing this client.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Dispatches a request through the credential/refresh pipeline.
    ///
    /// On a 403 with no prior retry: reads the refresh token (absent means
    /// the original denial is surfaced as-is), calls the refresh endpoint,
    /// persists the new access token and resubmits the request exactly
    /// once. If the refresh itself fails, both tokens are cleared and the
    /// session is reported unrecoverable. Every other outcome, including
    /// transport failures and non-403 statuses, propagates without retry.
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt: u8 = 0;

        loop {
            let mut request = self.http.request(method.clone(), &url);
            if let Some(token) = self.tokens.access_token()? {
                request = request.bearer_auth(token);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;

            if response.status() == StatusCode::FORBIDDEN && attempt == 0 {
                attempt += 1;

                let Some(refresh_token) = self.tokens.refresh_token()? else {
                    return Err(error_from_response(response).await);
                };

                match self.refresh_access_token(&refresh_token).await {
                    Ok(access_token) => {
                        self.tokens.store_access_token(&access_token)?;
                        tracing::debug!(
                            token = %mask_token(&access_token),
                            %path,
                            "access token refreshed, retrying request"
                        );
                        continue;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "token refresh failed, clearing session");
                        self.tokens.clear()?;
                        return Err(Error::SessionExpired);
                    }
                }
            }

            return Ok(response);
        }
    }

    /// Authenticated GET returning a decoded JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Method::GET, path, None).await?;
        decode(response).await
    }

    /// POST with a JSON body, returning a decoded JSON body.
    pub(crate) async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        decode(response).await
    }

    /// POST with a JSON body where success carries no payload (204/empty).
    pub(crate) async fn post_no_content(&self, path: &str, body: &Value) -> Result<()> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Calls the refresh endpoint directly.
    ///
    /// Deliberately bypasses [`ApiClient::send`]: the refresh call carries
    /// no bearer credential and must never trigger another refresh.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String> {
        let url = format!("{}/auth/refresh", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: RefreshResponse = response.json().await?;
        Ok(body.access_token)
    }
}

/// Decodes a success body, or maps the failure onto the error taxonomy.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    if response.status().is_success() {
        Ok(response.json::<T>().await?)
    } else {
        Err(error_from_response(response).await)
    }
}

/// Refresh endpoint response: a new access token only, the refresh token
/// is not rotated.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

/// Error body shapes the server is known to produce.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    errors: Vec<Value>,
    error: Option<String>,
    message: Option<String>,
}

impl ErrorBody {
    /// Most specific available message: the first field-level entry in
    /// `errors` (plain string or validator object), then `error`, then
    /// `message`.
    fn best_message(&self) -> Option<String> {
        self.errors
            .first()
            .and_then(|entry| {
                entry
                    .as_str()
                    .or_else(|| entry.get("msg").and_then(Value::as_str))
                    .or_else(|| entry.get("message").and_then(Value::as_str))
            })
            .map(str::to_string)
            .or_else(|| self.error.clone())
            .or_else(|| self.message.clone())
    }
}

/// Maps a non-success response onto the client error taxonomy.
async fn error_from_response(response: Response) -> Error {
    let status = response.status();
    let body: ErrorBody = response.json().await.unwrap_or_default();
    error_for(status, &body)
}

fn error_for(status: StatusCode, body: &ErrorBody) -> Error {
    let message = body
        .best_message()
        .unwrap_or_else(|| format!("HTTP {status}"));

    match status.as_u16() {
        400 | 422 => Error::Validation(message),
        409 => Error::Conflict(message),
        401 | 403 => Error::Auth(message),
        status => Error::Server { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> ErrorBody {
        serde_json::from_str(json).unwrap()
    }

    /// Test: field-level errors win over generic messages.
    #[test]
    fn test_error_body_prefers_field_errors() {
        let parsed = body(r#"{"errors":["email taken"],"message":"Registration failed"}"#);
        assert_eq!(parsed.best_message().as_deref(), Some("email taken"));
    }

    /// Test: validator-style error objects are understood.
    #[test]
    fn test_error_body_reads_validator_objects() {
        let parsed = body(r#"{"errors":[{"msg":"Invalid email","param":"email"}]}"#);
        assert_eq!(parsed.best_message().as_deref(), Some("Invalid email"));
    }

    #[test]
    fn test_error_body_falls_back_to_error_then_message() {
        let parsed = body(r#"{"error":"Email already registered"}"#);
        assert_eq!(
            parsed.best_message().as_deref(),
            Some("Email already registered")
        );

        let parsed = body(r#"{"message":"Invalid credentials"}"#);
        assert_eq!(parsed.best_message().as_deref(), Some("Invalid credentials"));
    }

    /// Test: status to taxonomy mapping.
    #[test]
    fn test_status_mapping() {
        let validation = error_for(StatusCode::BAD_REQUEST, &body(r#"{"errors":["bad email"]}"#));
        assert!(matches!(validation, Error::Validation(msg) if msg == "bad email"));

        let conflict = error_for(StatusCode::CONFLICT, &body(r#"{"error":"email taken"}"#));
        assert!(matches!(conflict, Error::Conflict(msg) if msg == "email taken"));

        let auth = error_for(StatusCode::UNAUTHORIZED, &body("{}"));
        assert!(matches!(auth, Error::Auth(msg) if msg == "HTTP 401 Unauthorized"));

        let server = error_for(StatusCode::INTERNAL_SERVER_ERROR, &body("{}"));
        assert!(matches!(server, Error::Server { status: 500, .. }));
    }
}
