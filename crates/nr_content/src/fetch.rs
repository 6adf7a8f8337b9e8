use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use nr_core::config::HttpConfig;
use nr_core::{Error, Fetcher, Result};

/// `Fetcher` over a shared reqwest client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!(url, "Fetching");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_fails() {
        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
        assert!(matches!(fetcher.fetch_text("not a url").await, Err(Error::Http(_))));
    }
}
