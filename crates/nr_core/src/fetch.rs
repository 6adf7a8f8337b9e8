use async_trait::async_trait;

use crate::Result;

/// Network access used by the content pipeline.
///
/// Implementations fail on non-success HTTP statuses. Dropping the returned
/// future abandons the request.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}
