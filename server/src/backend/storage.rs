//! Object storage for attraction images and barcode files.

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use uuid::Uuid;

use super::{ensure_success, BackendError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// Attraction cover images.
    Attractions,
    Barcodes,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Attractions => "attractions",
            Bucket::Barcodes => "barcodes",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file received from the partner, ready to be stored.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Randomized per-user key that keeps the original file extension:
/// `<user_id>/<uuid>.<ext>`. An extension that is not plain ASCII
/// alphanumerics is dropped, since it ends up in a URL path.
pub fn object_key(user_id: Uuid, file_name: &str) -> String {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{user_id}/{}.{ext}", Uuid::new_v4()),
        None => format!("{user_id}/{}", Uuid::new_v4()),
    }
}

#[derive(Clone)]
pub struct StorageClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl StorageClient {
    pub fn new(http: Client, backend_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: format!("{}/storage/v1", backend_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }

    /// Uploads `upload` under `key` on behalf of the token's owner.
    pub async fn upload(
        &self,
        bucket: Bucket,
        key: &str,
        upload: &Upload,
        access_token: &str,
    ) -> Result<(), BackendError> {
        let content_type = upload
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");

        let response = self
            .http
            .post(format!("{}/object/{bucket}/{key}", self.base_url))
            .header("apikey", &self.api_key)
            .header(CONTENT_TYPE, content_type)
            .bearer_auth(access_token)
            .body(upload.bytes.clone())
            .send()
            .await?;

        ensure_success(response).await?;
        tracing::debug!(%bucket, key, size = upload.bytes.len(), "Stored object");
        Ok(())
    }

    pub fn public_url(&self, bucket: Bucket, key: &str) -> String {
        format!("{}/object/public/{bucket}/{key}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_keeps_extension_under_user_prefix() {
        let user_id = Uuid::new_v4();
        let key = object_key(user_id, "Dolphins at Sunset.JPG");

        let (prefix, name) = key.split_once('/').unwrap();
        assert_eq!(prefix, user_id.to_string());
        assert!(name.ends_with(".JPG"));
        let stem = name.trim_end_matches(".JPG");
        assert!(Uuid::parse_str(stem).is_ok());
    }

    #[test]
    fn test_object_key_drops_unsafe_extension() {
        let user_id = Uuid::new_v4();

        let key = object_key(user_id, "a.png#x");
        let (_, name) = key.split_once('/').unwrap();
        assert!(Uuid::parse_str(name).is_ok(), "unexpected key {key}");

        let key = object_key(user_id, "cover.png?v=2");
        assert!(!key.contains('?') && !key.contains('.'));
    }

    #[test]
    fn test_object_keys_are_randomized() {
        let user_id = Uuid::new_v4();
        assert_ne!(
            object_key(user_id, "barcode.pdf"),
            object_key(user_id, "barcode.pdf")
        );
    }

    #[test]
    fn test_object_key_without_extension() {
        let user_id = Uuid::new_v4();
        let key = object_key(user_id, "barcode");
        assert!(!key.contains('.'));
    }

    #[test]
    fn test_public_url_layout() {
        let client = StorageClient::new(Client::new(), "https://backend.example.com/", "k");
        assert_eq!(
            client.public_url(Bucket::Barcodes, "u/1.pdf"),
            "https://backend.example.com/storage/v1/object/public/barcodes/u/1.pdf"
        );
    }
}
