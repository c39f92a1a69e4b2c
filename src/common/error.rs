//! Error types for miniweed

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === Identifier Errors ===
    #[error("Invalid file id: {0}")]
    Format(String),

    // === Network Errors ===
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    // === Cluster Errors ===
    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Volume location not found")]
    VolumeLocationNotFound,

    #[error("Not found: {0}")]
    NotFound(String),

    // === Input / Config Errors ===
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Is this a retryable error?
    ///
    /// Nothing in this crate retries on its own; this only helps callers that
    /// want to.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_timeout() || e.is_connect(),
            Error::Http { status, .. } => status.is_server_error(),
            _ => false,
        }
    }

    /// Build a format error for `fid`
    pub(crate) fn format(fid: &str, reason: &str) -> Self {
        Error::Format(format!("{}: {:?}", reason, fid))
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}
