// src/market/client.rs
use async_trait::async_trait;
use reqwest::header;
use std::time::Duration;
use crate::utils::error::FetchError;

/// Public page carrying the French power auction results.
pub const AUCTION_PAGE_URL: &str = "https://www.eex.com/en/markets/energy-certificates/french-auctions-power";

// The site serves a reduced page to non-browser agents.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Anything that can hand back the raw markup of a page.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches pages over HTTP with a browser User-Agent and a whole-request timeout.
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::info!("Downloading market page from: {}", url);
        tracing::debug!("Using User-Agent: {}", BROWSER_USER_AGENT);

        let response = self.client.get(url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(FetchError::Refused(status));
            }
            return Err(FetchError::Http(status));
        }

        let body = response.text().await?;
        tracing::debug!("Successfully downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let source = HttpSource::new(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on localhost is closed in test environments.
        let result = source.fetch("http://127.0.0.1:9/").await;
        assert!(matches!(result, Err(FetchError::Network(_))), "Expected network error, got {:?}", result);
    }
}
