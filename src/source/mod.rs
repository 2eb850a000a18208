//! Locations the dashboard artifacts are read from.
//!
//! A location string is one of:
//! - a local path (`data/final_results.json`)
//! - an HTTP(S) URL
//! - an S3 object (`s3://texas-covid/case_counts.csv`)
//!
//! Locations ending in `.gz` are gunzipped after reading.

mod http;
mod local;
mod s3;

pub use http::HttpArtifact;
pub use local::LocalFile;
pub use s3::S3Object;

use async_trait::async_trait;
use bytes::Bytes;
use flate2::read::GzDecoder;
use std::io::Read;
use tracing::debug;

use crate::error::{Error, Result};

/// Something that can produce the raw bytes of one artifact.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Human-readable location, used in logs and errors.
    fn location(&self) -> &str;

    /// Reads the raw (possibly compressed) artifact.
    async fn read(&self) -> Result<Bytes>;
}

/// Bytes already held in memory.
pub struct InMemory {
    location: String,
    bytes: Bytes,
}

impl InMemory {
    pub fn new(location: &str, bytes: impl Into<Bytes>) -> Self {
        Self {
            location: location.to_string(),
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl ArtifactSource for InMemory {
    fn location(&self) -> &str {
        &self.location
    }

    async fn read(&self) -> Result<Bytes> {
        Ok(self.bytes.clone())
    }
}

/// Resolves a location string into a source.
///
/// S3 locations load the ambient AWS configuration.
pub async fn open(location: &str) -> Result<Box<dyn ArtifactSource>> {
    if let Some(rest) = location.strip_prefix("s3://") {
        let (bucket, key) = rest
            .split_once('/')
            .filter(|(b, k)| !b.is_empty() && !k.is_empty())
            .ok_or_else(|| Error::unavailable(location, "expected s3://bucket/key"))?;
        let config = aws_config::load_from_env().await;
        let client = aws_sdk_s3::Client::new(&config);
        return Ok(Box::new(S3Object::new(client, bucket, key)));
    }

    if location.starts_with("http://") || location.starts_with("https://") {
        return Ok(Box::new(HttpArtifact::new(location)?));
    }

    Ok(Box::new(LocalFile::new(location)))
}

/// Reads a source and transparently decompresses `.gz` artifacts.
#[tracing::instrument(skip_all, fields(location = %source.location()))]
pub async fn read_artifact(source: &dyn ArtifactSource) -> Result<Vec<u8>> {
    let raw = source.read().await?;
    if !source.location().ends_with(".gz") {
        return Ok(raw.to_vec());
    }

    let mut decoded = Vec::new();
    GzDecoder::new(raw.as_ref())
        .read_to_end(&mut decoded)
        .map_err(|e| Error::unavailable(source.location(), e))?;
    debug!(
        compressed = raw.len(),
        decompressed = decoded.len(),
        "Artifact decompressed"
    );
    Ok(decoded)
}
