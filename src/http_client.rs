use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::time::timeout;
use tracing::trace;

/// Fetches the raw bytes behind a fully built request URL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Configuration for the HTTP transport
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: format!("flickr-rpc/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Async HTTP transport for API requests. Failures are returned as-is;
/// there is no retry.
pub struct HttpTransport {
    client: Client,
    config: HttpClientConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(Error::from)?;

        Ok(Self { client, config })
    }

    /// Make a single HTTP request with timeout
    async fn make_request(&self, url: &str) -> Result<Response> {
        let request_future = self.client.get(url).send();

        timeout(
            Duration::from_secs(self.config.timeout_seconds),
            request_future,
        )
        .await
        .map_err(|_| Error::Timeout {
            url: url.to_string(),
            timeout_seconds: self.config.timeout_seconds,
        })?
        .map_err(Error::from)
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.make_request(url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                message: format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            });
        }

        let bytes = response.bytes().await.map_err(Error::from)?;
        trace!(bytes = bytes.len(), "response received");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_http_transport_creation() {
        let transport = HttpTransport::new(HttpClientConfig::default());
        assert!(transport.is_ok());
    }

    #[test]
    fn test_default_user_agent() {
        let config = HttpClientConfig::default();
        assert!(config.user_agent.starts_with("flickr-rpc/"));
        assert_eq!(config.timeout_seconds, 30);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let config = HttpClientConfig {
            timeout_seconds: 2,
            ..Default::default()
        };
        let transport = HttpTransport::new(config).unwrap();

        // Port 9 (discard) on localhost is not expected to serve HTTP
        let result = transport.fetch("http://127.0.0.1:9/services/rest").await;
        match result {
            Err(Error::Http(_)) | Err(Error::Timeout { .. }) => (),
            other => panic!("expected transport failure, got {:?}", other.map(|b| b.len())),
        }
    }

    #[tokio::test]
    async fn test_mock_transport_returns_scripted_bytes() {
        let mut transport = MockTransport::new();
        transport
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(b"<rsp stat=\"ok\"/>".to_vec()));

        let bytes = transport.fetch("http://example.com").await.unwrap();
        assert_eq!(bytes, b"<rsp stat=\"ok\"/>");
    }
}
