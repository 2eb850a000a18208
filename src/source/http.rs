use async_trait::async_trait;
use bytes::Bytes;

use super::ArtifactSource;
use crate::error::{Error, Result};
use crate::fetch::{BasicClient, HttpClient, fetch_bytes};

/// An artifact served over HTTP(S).
pub struct HttpArtifact<C = BasicClient> {
    url: String,
    client: C,
}

impl HttpArtifact<BasicClient> {
    pub fn new(url: &str) -> Result<Self> {
        let client = BasicClient::new().map_err(|e| Error::unavailable(url, e))?;
        Ok(Self::with_client(url, client))
    }
}

impl<C: HttpClient> HttpArtifact<C> {
    pub fn with_client(url: &str, client: C) -> Self {
        Self {
            url: url.to_string(),
            client,
        }
    }
}

#[async_trait]
impl<C: HttpClient> ArtifactSource for HttpArtifact<C> {
    fn location(&self) -> &str {
        &self.url
    }

    async fn read(&self) -> Result<Bytes> {
        fetch_bytes(&self.client, &self.url)
            .await
            .map_err(|e| Error::unavailable(&self.url, e))
    }
}
