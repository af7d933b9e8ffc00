//! Client SDK for the record import service
//!
//! The service keeps import profiles and blobs, the binary payloads that are
//! queued for transformation and import. This crate exposes one async trait
//! covering every remote operation, an HTTP implementation of it, and the
//! query builder used to filter blob listings.

use async_trait::async_trait;
use futures::Stream;
use reqwest::Body;
use serde_json::Value;
use std::pin::Pin;

pub mod error;
pub mod http_client;
pub mod query;
pub mod types;

pub use error::ApiError;
pub use http_client::HttpRecordImportClient;
pub use query::{build_blob_query, BlobQuery, BlobQueryInput};
pub use types::*;

/// Pages of blob metadata, fetched lazily as the stream is polled
pub type BlobPageStream = Pin<Box<dyn Stream<Item = Result<Vec<BlobMetadata>, ApiError>> + Send>>;

#[async_trait]
pub trait RecordImportClient: Send + Sync {
    /// Create or replace a profile
    async fn modify_profile(&self, id: &str, payload: &Value) -> Result<(), ApiError>;

    async fn query_profiles(&self) -> Result<Value, ApiError>;

    async fn get_profile(&self, id: &str) -> Result<Value, ApiError>;

    async fn delete_profile(&self, id: &str) -> Result<(), ApiError>;

    /// Upload a new blob and return the id the service assigned to it
    async fn create_blob(
        &self,
        profile: &str,
        content_type: &str,
        body: Body,
    ) -> Result<String, ApiError>;

    async fn get_blob_metadata(&self, id: &str) -> Result<BlobMetadata, ApiError>;

    async fn get_blob_content(&self, id: &str) -> Result<BlobContent, ApiError>;

    async fn delete_blob(&self, id: &str) -> Result<(), ApiError>;

    async fn delete_blob_content(&self, id: &str) -> Result<(), ApiError>;

    /// Stop processing of a blob
    async fn set_aborted(&self, id: &str) -> Result<(), ApiError>;

    /// List blobs matching `query`, one item per page the service returns
    fn get_blobs(&self, query: BlobQuery) -> BlobPageStream;
}

/// Factory for creating RecordImportClient instances
pub struct RecordImportClientFactory;

impl RecordImportClientFactory {
    pub fn create_http_client(config: &ClientConfig) -> Result<Box<dyn RecordImportClient>, ApiError> {
        Ok(Box::new(HttpRecordImportClient::new(config)?))
    }
}
