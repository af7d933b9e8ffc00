//! Error types for calls against the record import service
//!
//! Failures are split by where they happen: the service answered with an
//! error status, the request never completed, or the response could not be
//! understood. Callers usually only care about the first kind, which carries
//! the HTTP status so it can be reported to the user.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API call failed: {} ({})", .status.canonical_reason().unwrap_or("Unknown status"), .status.as_u16())]
    Status { status: StatusCode },
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid response from service: {0}")]
    InvalidResponse(String),
    #[error("Service did not return a Location header for the created blob")]
    MissingLocation,
    #[error("Failed to decode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status reported by the service, if this is a status failure
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status } => Some(*status),
            _ => None,
        }
    }
}
