use async_trait::async_trait;
use bytes::Bytes;

use super::ArtifactSource;
use crate::error::{Error, Result};

/// An object in an S3 bucket, fetched with `GetObject`.
pub struct S3Object {
    client: aws_sdk_s3::Client,
    bucket: String,
    key: String,
    location: String,
}

impl S3Object {
    pub fn new(client: aws_sdk_s3::Client, bucket: &str, key: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            key: key.to_string(),
            location: format!("s3://{bucket}/{key}"),
        }
    }
}

#[async_trait]
impl ArtifactSource for S3Object {
    fn location(&self) -> &str {
        &self.location
    }

    async fn read(&self) -> Result<Bytes> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
            .map_err(|e| Error::unavailable(&self.location, e))?;

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| Error::unavailable(&self.location, e))?;

        Ok(body.into_bytes())
    }
}
