use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::pin::Pin;
use std::str::FromStr;

use crate::error::ApiError;

/// Lifecycle stage of a blob as reported by the import service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlobState {
    PendingTransformation,
    TransformationInProgress,
    TransformationFailed,
    Transformed,
    Processed,
    Aborted,
}

impl BlobState {
    pub const ALL: [BlobState; 6] = [
        BlobState::PendingTransformation,
        BlobState::TransformationInProgress,
        BlobState::TransformationFailed,
        BlobState::Transformed,
        BlobState::Processed,
        BlobState::Aborted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlobState::PendingTransformation => "PENDING_TRANSFORMATION",
            BlobState::TransformationInProgress => "TRANSFORMATION_IN_PROGRESS",
            BlobState::TransformationFailed => "TRANSFORMATION_FAILED",
            BlobState::Transformed => "TRANSFORMED",
            BlobState::Processed => "PROCESSED",
            BlobState::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for BlobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the exact upper-case name. Case folding is the caller's job.
impl FromStr for BlobState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlobState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or(())
    }
}

/// Blob metadata record. Fields the client does not know about are kept in
/// `extra` so that printing a record shows everything the service sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobMetadata {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_time: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ApiError>> + Send>>;

/// Streamed blob content along with the content type the service reported
pub struct BlobContent {
    pub content_type: String,
    pub stream: ByteStream,
}

impl fmt::Debug for BlobContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobContent")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Connection settings for the HTTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
}

pub const DEFAULT_USER_AGENT: &str = "Record import CLI";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            username: None,
            password: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
