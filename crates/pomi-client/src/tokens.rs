//! Session token storage and retrieval.
//!
//! Stores the access/refresh token pair in `<home>/tokens.json` with
//! restricted permissions (0600). Tokens are never logged or displayed in
//! full.
//!
//! The two entries are persisted independently so a half-present state is
//! representable on disk, but [`TokenStore::read`] only ever hands out a
//! complete pair: an access token without its refresh counterpart (or the
//! reverse) reads as logged-out.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// An access/refresh token pair as issued by the auth endpoints.
///
/// Both tokens are opaque strings; the client never inspects expiry or
/// signature. That is the server's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// The access token (short-lived)
    pub access_token: String,
    /// The refresh token (long-lived)
    pub refresh_token: String,
}

/// On-disk shape: each entry stored independently.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TokensFile {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// File-backed store for the session token pair.
///
/// Constructed explicitly and handed to the HTTP client rather than being
/// process-global, so tests (and embedders) can point it anywhere.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Creates a store at the default location (`<POMI_HOME>/tokens.json`).
    pub fn new() -> Self {
        Self::at(paths::tokens_path())
    }

    /// Creates a store backed by a specific file path.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the tokens file from disk.
    /// Returns an empty file if it doesn't exist.
    fn load_file(&self) -> Result<TokensFile> {
        if !self.path.exists() {
            return Ok(TokensFile::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read tokens from {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse tokens from {}", self.path.display()))
    }

    /// Writes the tokens file to disk with restricted permissions (0600).
    fn save_file(&self, file: &TokensFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(file).context("Failed to serialize tokens")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut out = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            out.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Stores a full token pair, overwriting any prior values.
    ///
    /// No validation of token shape: any non-empty string is accepted.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn store(&self, tokens: &TokenPair) -> Result<()> {
        self.save_file(&TokensFile {
            access_token: Some(tokens.access_token.clone()),
            refresh_token: Some(tokens.refresh_token.clone()),
        })
    }

    /// Replaces only the access token, keeping the refresh token.
    ///
    /// The refresh endpoint does not rotate refresh tokens, so a silent
    /// refresh only updates this one entry.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn store_access_token(&self, access_token: &str) -> Result<()> {
        let mut file = self.load_file()?;
        file.access_token = Some(access_token.to_string());
        self.save_file(&file)
    }

    /// Returns the stored pair, or `None` unless BOTH tokens are present.
    ///
    /// A dangling access token without its refresh counterpart (or the
    /// reverse) must not be used.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn read(&self) -> Result<Option<TokenPair>> {
        let file = self.load_file()?;
        match (file.access_token, file.refresh_token) {
            (Some(access_token), Some(refresh_token)) => Ok(Some(TokenPair {
                access_token,
                refresh_token,
            })),
            _ => Ok(None),
        }
    }

    /// Returns the stored access token, if any.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn access_token(&self) -> Result<Option<String>> {
        Ok(self.load_file()?.access_token)
    }

    /// Returns the stored refresh token, if any.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self.load_file()?.refresh_token)
    }

    /// Removes both tokens unconditionally. Idempotent.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to remove tokens at {}", self.path.display())),
        }
    }

    /// Cheap "is logged in" signal: access token present, validity unknown.
    pub fn has_access_token(&self) -> bool {
        matches!(self.load_file(), Ok(file) if file.access_token.is_some())
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 {
        return "***".to_string();
    }
    format!("{}...", &token[..12])
}
