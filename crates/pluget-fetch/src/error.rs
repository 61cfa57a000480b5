//! Error types for pluget-fetch.

use std::fmt;
use std::io;
use std::path::PathBuf;

use pluget_verify::Algorithm;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

/// A failure while draining a response body.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The response framing was malformed or cut short. Safe to retry.
    #[error("malformed response stream: {0}")]
    Corrupt(String),

    /// The connection itself failed.
    #[error("response stream failed: {0}")]
    Io(#[from] io::Error),
}

/// The registry rejected a request with a 4xx status other than 404.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response4xxError {
    pub message:     Option<String>,
    pub status_code: u16,
    pub system_info: Option<String>,
}

impl Response4xxError {
    pub fn with_system_info(mut self, system_info: impl Into<String>) -> Self {
        self.system_info = Some(system_info.into());
        self
    }
}

impl fmt::Display for Response4xxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, &self.system_info) {
            (Some(message), Some(system_info)) => write!(f, "{message} ({system_info})"),
            (Some(message), None) => write!(f, "{}: {message}", self.status_code),
            (None, _) => write!(f, "{}", self.status_code),
        }
    }
}

impl std::error::Error for Response4xxError {}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("not found: {url}")]
    NotFound { url: String },

    #[error(transparent)]
    BadRequest(#[from] Response4xxError),

    #[error("API returned invalid status: {status_line}")]
    UnexpectedStatus { status_line: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url:    String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("failed to copy plugin archive from {path}: {source}")]
    LocalArchive {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write downloaded archive: {0}")]
    Write(#[source] io::Error),

    #[error("invalid checksum for {plugin}: {source}")]
    InvalidChecksum {
        plugin: String,
        #[source]
        source: pluget_verify::VerifyError,
    },

    #[error(
        "expected {algorithm} checksum does not match the downloaded archive of {plugin} - please contact {contact}"
    )]
    ChecksumMismatch {
        plugin:    String,
        algorithm: Algorithm,
        expected:  String,
        actual:    String,
        contact:   String,
    },

    #[error("corrupt HTTP response from source, please try again")]
    CorruptResponse { attempts: u32 },

    #[error("download cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn is_not_found(&self) -> bool { matches!(self, FetchError::NotFound { .. }) }
}
