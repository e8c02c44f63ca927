use std::collections::HashMap;
use std::sync::RwLock;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::Client as S3Client;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("upload failed: {0}")]
    Upload(String),

    #[error("delete failed: {0}")]
    Delete(String),
}

/// Bucket holding user images. Keys are fixed per user and overwritten on
/// every upload.
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `body` at `key`, replacing any existing object, and return the
    /// public URL.
    async fn upload(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> Result<String, StorageError>;

    /// Remove the object at `key`. Removing a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    fn public_url(&self, key: &str) -> String;
}

#[derive(Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
    public_url: String,
}

impl S3Storage {
    pub async fn new(
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        public_url: &str,
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "uwc");

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = S3Client::from_conf(config);

        // Ensure bucket exists; "already owned" errors are expected after the first boot.
        if let Err(e) = client.create_bucket().bucket(bucket).send().await {
            tracing::debug!(bucket = %bucket, error = %e, "create_bucket skipped");
        }

        tracing::info!(endpoint = %endpoint, bucket = %bucket, "object storage client initialized");

        Self {
            client,
            bucket: bucket.to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStorage for S3Storage {
    async fn upload(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body.into())
            .content_type(content_type)
            .cache_control(cache_control)
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete(e.to_string()))?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_url, self.bucket, key)
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
    pub cache_control: String,
}

/// Process-local bucket for tests and `storage = "memory"` runs.
pub struct InMemoryStorage {
    base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl InMemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .ok()
            .and_then(|objects| objects.get(key).cloned())
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn upload(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> Result<String, StorageError> {
        let mut objects = self
            .objects
            .write()
            .map_err(|e| StorageError::Upload(e.to_string()))?;
        objects.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                cache_control: cache_control.to_string(),
            },
        );
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut objects = self
            .objects
            .write()
            .map_err(|e| StorageError::Delete(e.to_string()))?;
        objects.remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_overwrites_fixed_key() {
        let storage = InMemoryStorage::new("http://localhost:9000/uwc-images/");
        storage.upload("profile_pic/u1", vec![1], "image/png", "max-age=3600").await.unwrap();
        let url = storage
            .upload("profile_pic/u1", vec![2, 3], "image/webp", "max-age=3600")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:9000/uwc-images/profile_pic/u1");
        assert_eq!(storage.len(), 1);
        let obj = storage.get("profile_pic/u1").unwrap();
        assert_eq!(obj.body, vec![2, 3]);
        assert_eq!(obj.content_type, "image/webp");
    }

    #[tokio::test]
    async fn deleting_missing_object_succeeds() {
        let storage = InMemoryStorage::new("http://x");
        assert!(storage.delete("Banner/nobody").await.is_ok());
        assert!(storage.is_empty());
    }
}
