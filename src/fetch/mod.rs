//! HTTP download of upstream artifacts.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Result, anyhow};
use bytes::Bytes;
use tracing::debug;

/// GETs `url` and returns the body. Non-2xx responses are errors.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Bytes> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow!("GET {} returned status {}: {}", url, status, body));
    }

    let bytes = resp.bytes().await?;
    debug!(url, bytes = bytes.len(), "Artifact downloaded");
    Ok(bytes)
}
