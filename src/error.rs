//! Error types.
//!
//! Missing task ids are not errors anywhere in this crate; store operations report
//! them through a `false` return instead.

use std::path::PathBuf;

use thiserror::Error;

/// A string did not name a member of one of the closed field enumerations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("invalid status '{0}' (expected todo, in-progress or done)")]
    InvalidStatus(String),

    #[error("invalid priority '{0}' (expected low, medium or high)")]
    InvalidPriority(String),

    #[error("invalid view '{0}' (expected list, board or calendar)")]
    InvalidView(String),
}

/// Errors raised at the store boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    InvalidStatus(#[from] FieldError),
}

/// Failures talking to the external task/chat backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response.
    #[error("{method} {path} failed with status {status}")]
    Request {
        method: &'static str,
        path: String,
        status: u16,
    },

    /// Connection, TLS or timeout failure before a response arrived.
    #[error("{method} {path} failed: {source}")]
    Transport {
        method: &'static str,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// 2xx response whose body was not the expected JSON.
    #[error("{method} {path} returned malformed JSON: {source}")]
    Decode {
        method: &'static str,
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Method and path of the failed call.
    pub fn context(&self) -> (&'static str, &str) {
        match self {
            ApiError::Request { method, path, .. }
            | ApiError::Transport { method, path, .. }
            | ApiError::Decode { method, path, .. } => (*method, path.as_str()),
        }
    }
}

/// Config and seed file problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("seed file {path} contains task id '{id}' more than once")]
    DuplicateId { path: PathBuf, id: String },

    #[error("failed to parse seed file {path}: {source}")]
    Seed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
