//! Core Pomi client library (session, auth API, token storage).

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod tokens;
pub mod types;

pub use error::{Error, Result};
