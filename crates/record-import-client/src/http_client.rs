use async_stream::try_stream;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{Body, Method, RequestBuilder, Response};
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::ApiError;
use crate::query::BlobQuery;
use crate::types::{BlobContent, BlobMetadata, ClientConfig};
use crate::{BlobPageStream, RecordImportClient};

const IMPORT_PROFILE: &str = "Import-Profile";
const NEXT_OFFSET: &str = "NextOffset";

/// HTTP client for a remote record import service
#[derive(Clone)]
pub struct HttpRecordImportClient {
    base_url: String,
    client: reqwest::Client,
    username: Option<String>,
    password: Option<String>,
    timeout: Duration,
}

impl HttpRecordImportClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        if config.api_url.trim().is_empty() {
            return Err(ApiError::Config("API URL is not defined".to_string()));
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            client,
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        log::debug!("{} {}", method, url);
        let builder = self.client.request(method, url).timeout(self.timeout);
        match &self.username {
            Some(username) => builder.basic_auth(username, self.password.as_ref()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            log::debug!("Service responded with {}", status);
            return Err(ApiError::Status { status });
        }
        Ok(response)
    }

    async fn fetch_blob_page(
        &self,
        query: &BlobQuery,
        offset: Option<&str>,
    ) -> Result<(Vec<BlobMetadata>, Option<String>), ApiError> {
        let mut pairs = query.to_pairs();
        if let Some(offset) = offset {
            pairs.push(("offset", offset.to_string()));
        }

        let builder = self
            .request(Method::GET, &self.url(&["blobs"]))
            .header(ACCEPT, "application/json")
            .query(&pairs);
        let response = self.send(builder).await?;
        let next_offset = header_value(response.headers(), NEXT_OFFSET);
        let page = response.json::<Vec<BlobMetadata>>().await?;
        Ok((page, next_offset))
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Last path segment of a `Location` header value
fn id_from_location(location: &str) -> Option<String> {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(|id| urlencoding::decode(id).map(|s| s.into_owned()).unwrap_or_else(|_| id.to_string()))
}

#[async_trait]
impl RecordImportClient for HttpRecordImportClient {
    async fn modify_profile(&self, id: &str, payload: &Value) -> Result<(), ApiError> {
        let builder = self
            .request(Method::PUT, &self.url(&["profiles", id]))
            .json(payload);
        self.send(builder).await?;
        Ok(())
    }

    async fn query_profiles(&self) -> Result<Value, ApiError> {
        let builder = self
            .request(Method::GET, &self.url(&["profiles"]))
            .header(ACCEPT, "application/json");
        Ok(self.send(builder).await?.json().await?)
    }

    async fn get_profile(&self, id: &str) -> Result<Value, ApiError> {
        let builder = self
            .request(Method::GET, &self.url(&["profiles", id]))
            .header(ACCEPT, "application/json");
        Ok(self.send(builder).await?.json().await?)
    }

    async fn delete_profile(&self, id: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &self.url(&["profiles", id])))
            .await?;
        Ok(())
    }

    async fn create_blob(
        &self,
        profile: &str,
        content_type: &str,
        body: Body,
    ) -> Result<String, ApiError> {
        let builder = self
            .request(Method::POST, &self.url(&["blobs"]))
            .header(CONTENT_TYPE, content_type)
            .header(IMPORT_PROFILE, profile)
            .body(body);
        let response = self.send(builder).await?;

        header_value(response.headers(), LOCATION.as_str())
            .as_deref()
            .and_then(id_from_location)
            .ok_or(ApiError::MissingLocation)
    }

    async fn get_blob_metadata(&self, id: &str) -> Result<BlobMetadata, ApiError> {
        let builder = self
            .request(Method::GET, &self.url(&["blobs", id]))
            .header(ACCEPT, "application/json");
        Ok(self.send(builder).await?.json().await?)
    }

    async fn get_blob_content(&self, id: &str) -> Result<BlobContent, ApiError> {
        let response = self
            .send(self.request(Method::GET, &self.url(&["blobs", id, "content"])))
            .await?;

        let content_type = header_value(response.headers(), CONTENT_TYPE.as_str())
            .ok_or_else(|| ApiError::InvalidResponse("missing Content-Type header".to_string()))?;
        let stream = response.bytes_stream().map_err(ApiError::from);

        Ok(BlobContent {
            content_type,
            stream: Box::pin(stream),
        })
    }

    async fn delete_blob(&self, id: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &self.url(&["blobs", id])))
            .await?;
        Ok(())
    }

    async fn delete_blob_content(&self, id: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &self.url(&["blobs", id, "content"])))
            .await?;
        Ok(())
    }

    async fn set_aborted(&self, id: &str) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, &self.url(&["blobs", id]))
            .json(&json!({ "op": "abort" }));
        self.send(builder).await?;
        Ok(())
    }

    fn get_blobs(&self, query: BlobQuery) -> BlobPageStream {
        let client = self.clone();

        let pages = try_stream! {
            let mut offset: Option<String> = None;
            loop {
                let (page, next_offset) = client.fetch_blob_page(&query, offset.as_deref()).await?;
                yield page;

                match next_offset {
                    Some(next) if offset.as_deref() != Some(next.as_str()) => offset = Some(next),
                    Some(next) => {
                        log::warn!("Service repeated offset {}, stopping", next);
                        break;
                    }
                    None => break,
                }
            }
        };

        Box::pin(pages)
    }
}
