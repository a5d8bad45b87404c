use crate::config::StorageConfig;
use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::header;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("object store rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` as a publicly readable object, replacing
    /// whatever was there, and return the object's public URL.
    async fn put_public(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError>;
}

/// One image per user; a new upload overwrites the old one.
pub fn profile_image_key(user_id: i64) -> String {
    format!("user_{user_id}.png")
}

pub async fn upload_profile_image(
    store: &dyn ObjectStore,
    user_id: i64,
    bytes: Bytes,
    content_type: &str,
) -> Result<String, StorageError> {
    store
        .put_public(&profile_image_key(user_id), bytes, content_type)
        .await
}

/// S3-style bucket reached over plain HTTP `PUT`.
pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    public_base_url: String,
    token: Option<String>,
}

impl HttpObjectStore {
    /// Every request, body included, is bounded by `config.timeout`.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put_public(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let size = bytes.len();
        let mut request = self
            .client
            .put(format!("{}/{}", self.endpoint, key))
            .header(header::CONTENT_TYPE, content_type)
            .header("x-amz-acl", "public-read")
            .body(bytes);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Uploaded {} ({} bytes)", key, size);
        Ok(format!("{}/{}", self.public_base_url, key))
    }
}
