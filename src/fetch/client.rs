use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes prepared HTTP requests; wrapped by sources that need auth or retries.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
