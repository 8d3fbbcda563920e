//! Error type shared by the token manager and the entity client.
//!
//! HTTP-level outcomes (400, 401, 404, ...) are not errors: they come back as
//! a status inside [`crate::transport::ApiResponse`]. Only transport failures,
//! undecodable bodies, and caller-side misuse end up here.

use reqwest::StatusCode;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur while talking to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse response body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Authentication failed with status {status}: {body}")]
    Authentication { status: StatusCode, body: String },

    #[error("{operation} failed with status {status}")]
    UnexpectedStatus {
        operation: String,
        status: StatusCode,
    },

    #[error("Index {index} out of range for listing of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}
