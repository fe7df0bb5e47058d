//! S3-compatible image store backend.
//!
//! Works against AWS S3 and MinIO (path-style addressing plus an endpoint
//! override). Keys are namespaced under `products/` and named after the
//! upload instant, so replacing an image never overwrites the blob it
//! replaces.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use furnish_storage::{ImageStore, ImageStoreError};

/// Prefix under which all product images are stored.
const KEY_PREFIX: &str = "products/";

/// S3 connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct S3Config {
    /// Endpoint override for S3-compatible stores (e.g. "http://localhost:9000").
    /// Leave unset for AWS S3.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    pub bucket: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    /// Base URL under which uploaded keys are publicly reachable, including
    /// the bucket (e.g. "http://localhost:9000/furnish"). Defaults to the
    /// AWS virtual-hosted URL for the bucket.
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// Path-style addressing, required by MinIO.
    #[serde(default)]
    pub force_path_style: bool,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// Image store backed by an S3-compatible object store.
#[derive(Clone)]
pub struct S3ImageStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3ImageStore {
    /// Builds a client from the configuration. No network call is made
    /// here; the bucket is assumed to exist and allow public reads.
    #[must_use]
    pub fn new(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "furnish-config",
        );

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(config.force_path_style);

        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }

        let public_base_url = config
            .public_base_url
            .clone()
            .unwrap_or_else(|| {
                format!(
                    "https://{}.s3.{}.amazonaws.com",
                    config.bucket, config.region
                )
            })
            .trim_end_matches('/')
            .to_string();

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            public_base_url,
        }
    }

    fn object_key(filename: &str) -> String {
        let ext = filename
            .rfind('.')
            .map(|i| &filename[i..])
            .unwrap_or_default()
            .to_ascii_lowercase();
        let stamp = OffsetDateTime::now_utc().unix_timestamp_nanos();
        format!("{KEY_PREFIX}{stamp}{ext}")
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}

/// Extracts the object key from a public URL produced by this store.
///
/// Only the `products/…` suffix is trusted; everything before it (scheme,
/// host, bucket path) is deployment-dependent.
pub(crate) fn key_from_url(url: &str) -> Option<&str> {
    let idx = url.find(KEY_PREFIX)?;
    // Reject a bare prefix match embedded in a query string or fragment.
    let key = &url[idx..];
    if key.len() > KEY_PREFIX.len() {
        Some(key)
    } else {
        None
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        content_type: &str,
    ) -> Result<String, ImageStoreError> {
        let key = Self::object_key(filename);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| ImageStoreError::transport(format!("put {key}: {e}")))?;

        tracing::debug!(bucket = %self.bucket, key = %key, "image uploaded");
        Ok(self.public_url(&key))
    }

    async fn delete(&self, url: &str) -> Result<(), ImageStoreError> {
        let key = key_from_url(url).ok_or_else(|| ImageStoreError::invalid_url(url))?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ImageStoreError::transport(format!("delete {key}: {e}")))?;

        tracing::debug!(bucket = %self.bucket, key = %key, "image deleted");
        Ok(())
    }
}
