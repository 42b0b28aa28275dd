//! Object storage for symptom images.
//!
//! The catalog only ever needs two capabilities — upload an image and
//! delete it by key — so backends are hidden behind the narrow
//! [`ImageStore`] trait and injected at construction. Callers store the
//! returned key opaquely and never interpret it.

use std::path::PathBuf;

use crate::{AppError, AppResult};

/// Uploaded image metadata.
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Storage key (path or object key).
    pub key: String,
    /// Public URL to access the image.
    pub url: String,
    /// Size in bytes.
    pub size: u64,
    /// MD5 hash of the content.
    pub md5: String,
}

/// Image storage backend.
#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload an image, returning its storage key and public URL.
    async fn upload_image(&self, key: &str, data: &[u8]) -> AppResult<StoredImage>;

    /// Delete an image by key. Deleting a missing key is not an error.
    async fn delete_image(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Local filesystem image store.
pub struct LocalImageStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalImageStore {
    /// Create a new local image store.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self { base_path, base_url }
    }
}

#[async_trait::async_trait]
impl ImageStore for LocalImageStore {
    async fn upload_image(&self, key: &str, data: &[u8]) -> AppResult<StoredImage> {
        let path = self.base_path.join(key);

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        let md5 = format!("{:x}", md5::compute(data));

        Ok(StoredImage {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            md5,
        })
    }

    async fn delete_image(&self, key: &str) -> AppResult<()> {
        let path = self.base_path.join(key);
        if path.exists() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// S3-compatible (MinIO) image store.
#[cfg(feature = "s3")]
pub struct S3ImageStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    endpoint: String,
}

#[cfg(feature = "s3")]
impl S3ImageStore {
    /// Create a new S3 image store.
    pub fn new(
        endpoint: &str,
        bucket: String,
        region: &str,
        access_key_id: &str,
        secret_access_key: &str,
    ) -> Self {
        use aws_config::Region;
        use aws_sdk_s3::config::Credentials;

        let credentials =
            Credentials::new(access_key_id, secret_access_key, None, None, "hydromed");

        let config = aws_sdk_s3::Config::builder()
            .endpoint_url(endpoint)
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(config),
            bucket,
            endpoint: endpoint.to_string(),
        }
    }
}

#[cfg(feature = "s3")]
#[async_trait::async_trait]
impl ImageStore for S3ImageStore {
    async fn upload_image(&self, key: &str, data: &[u8]) -> AppResult<StoredImage> {
        use aws_sdk_s3::primitives::ByteStream;

        let md5 = format!("{:x}", md5::compute(data));

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        Ok(StoredImage {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            md5,
        })
    }

    async fn delete_image(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 delete failed: {e}")))?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.bucket,
            key
        )
    }
}

/// Generate a unique storage key for an uploaded image.
#[must_use]
pub fn generate_image_key(name_hint: &str, original_name: &str) -> String {
    let slug: String = name_hint
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();

    // Extract extension from original name
    let extension = original_name
        .rfind('.')
        .filter(|&pos| pos > 0 && pos < original_name.len() - 1)
        .map(|pos| &original_name[pos + 1..])
        .filter(|ext| ext.len() <= 10 && !ext.is_empty())
        .unwrap_or("bin");

    format!("{}_{}.{}", slug.trim_matches('-'), uuid::Uuid::new_v4(), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_image_key() {
        let key = generate_image_key("Dry Mouth", "photo.jpg");
        assert!(key.starts_with("dry-mouth_"));
        assert!(key.ends_with(".jpg"));
    }

    #[test]
    fn test_generate_image_key_no_extension() {
        let key = generate_image_key("fever", "upload");
        assert!(key.ends_with(".bin"));
    }

    #[test]
    fn test_local_public_url() {
        let store = LocalImageStore::new(PathBuf::from("./files"), "/files/".to_string());
        assert_eq!(store.public_url("a.jpg"), "/files/a.jpg");
    }
}
