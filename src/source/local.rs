use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

use super::ArtifactSource;
use crate::error::{Error, Result};

/// An artifact on the local filesystem.
pub struct LocalFile {
    location: String,
    path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            location: path.display().to_string(),
            path,
        }
    }
}

#[async_trait]
impl ArtifactSource for LocalFile {
    fn location(&self) -> &str {
        &self.location
    }

    async fn read(&self) -> Result<Bytes> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| Error::unavailable(&self.location, e))?;
        Ok(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[tokio::test]
    async fn test_reads_existing_file() {
        let path = env::temp_dir().join("texas_rt_local_source.json");
        fs::write(&path, b"{\"a\":1}").unwrap();

        let source = LocalFile::new(&path);
        assert_eq!(source.read().await.unwrap().as_ref(), b"{\"a\":1}");

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let source = LocalFile::new("/nonexistent/texas_rt/final_results.json");
        let err = source.read().await.unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
    }
}
