use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use record_import_client::{
    ApiError, BlobContent, BlobMetadata, BlobPageStream, BlobQuery, RecordImportClient,
};
use reqwest::{Body, StatusCode};
use serde_json::{json, Value};
use std::sync::Mutex;

/// In-memory client that records every call it receives
#[derive(Default)]
pub struct MockClient {
    pub calls: Mutex<Vec<String>>,
    pub fail_with: Option<StatusCode>,
    pub blob_pages: Vec<Vec<BlobMetadata>>,
    pub content_type: String,
    pub content: Vec<u8>,
    pub queries: Mutex<Vec<BlobQuery>>,
    pub profiles: Mutex<Vec<(String, Value)>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            content_type: "application/json".to_string(),
            ..Default::default()
        }
    }

    pub fn failing(status: StatusCode) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_with {
            Some(status) => Err(ApiError::Status { status }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordImportClient for MockClient {
    async fn modify_profile(&self, id: &str, payload: &Value) -> Result<(), ApiError> {
        self.record(format!("modify_profile {}", id))?;
        self.profiles
            .lock()
            .unwrap()
            .push((id.to_string(), payload.clone()));
        Ok(())
    }

    async fn query_profiles(&self) -> Result<Value, ApiError> {
        self.record("query_profiles".to_string())?;
        Ok(json!([{"id": "foo"}, {"id": "bar"}]))
    }

    async fn get_profile(&self, id: &str) -> Result<Value, ApiError> {
        self.record(format!("get_profile {}", id))?;
        Ok(json!({"id": id}))
    }

    async fn delete_profile(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("delete_profile {}", id))
    }

    async fn create_blob(
        &self,
        profile: &str,
        content_type: &str,
        _body: Body,
    ) -> Result<String, ApiError> {
        self.record(format!("create_blob {} {}", profile, content_type))?;
        Ok("new-blob".to_string())
    }

    async fn get_blob_metadata(&self, id: &str) -> Result<BlobMetadata, ApiError> {
        self.record(format!("get_blob_metadata {}", id))?;
        Ok(serde_json::from_value(json!({
            "id": id,
            "profile": "foo",
            "state": "TRANSFORMED",
            "creationTime": "2022-05-12T09:00:00.000Z",
            "modificationTime": "2022-05-12T10:30:00.000Z"
        }))?)
    }

    async fn get_blob_content(&self, id: &str) -> Result<BlobContent, ApiError> {
        self.record(format!("get_blob_content {}", id))?;
        let chunks: Vec<Result<Bytes, ApiError>> = vec![Ok(Bytes::from(self.content.clone()))];
        Ok(BlobContent {
            content_type: self.content_type.clone(),
            stream: Box::pin(stream::iter(chunks)),
        })
    }

    async fn delete_blob(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("delete_blob {}", id))
    }

    async fn delete_blob_content(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("delete_blob_content {}", id))
    }

    async fn set_aborted(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("set_aborted {}", id))
    }

    fn get_blobs(&self, query: BlobQuery) -> BlobPageStream {
        self.queries.lock().unwrap().push(query);
        let pages: Vec<Result<Vec<BlobMetadata>, ApiError>> = match self.record("get_blobs".to_string()) {
            Ok(()) => self.blob_pages.iter().cloned().map(Ok).collect(),
            Err(err) => vec![Err(err)],
        };
        Box::pin(stream::iter(pages))
    }
}
